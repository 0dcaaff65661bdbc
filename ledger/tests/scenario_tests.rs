//! End-to-end election scenarios driven through the public API.

use std::sync::Arc;

use election_ledger::{AccessTable, ElectionEvent, ElectionLedger, LedgerError, Role, UniquenessTokenIssuer, VOTE_DELAY_SECS};
use election_nullables::{NullClock, NullPayout};
use election_types::{Amount, Phase, Principal};

const DEPLOYER: u8 = 0xad;
const FOUNDER1: u8 = 0xf1;
const FOUNDER2: u8 = 0xf2;
const ALICE: u8 = 0x01;
const BOB: u8 = 0x02;

fn p(byte: u8) -> Principal {
    Principal::repeat_byte(byte)
}

fn deploy(clock: Arc<NullClock>) -> ElectionLedger {
    let deployer = p(DEPLOYER);
    let mut ledger = ElectionLedger::new(
        p(0x1e),
        UniquenessTokenIssuer::new(deployer),
        AccessTable::with_admin(deployer),
        clock,
    );
    ledger.grant_minter(&deployer).unwrap();
    ledger.grant_role(&deployer, Role::Funder, p(FOUNDER1)).unwrap();
    ledger.grant_role(&deployer, Role::Funder, p(FOUNDER2)).unwrap();
    ledger
}

#[test]
fn full_election_lifecycle() {
    let clock = Arc::new(NullClock::new(1_700_000_000));
    let mut ledger = deploy(clock.clone());
    let admin = p(DEPLOYER);

    ledger.add_candidate(&admin, "Alice", "Experienced leader", p(ALICE)).unwrap();
    ledger.add_candidate(&admin, "Bob", "Innovative thinker", p(BOB)).unwrap();

    ledger.advance_phase(&admin, Phase::FoundCandidates).unwrap();
    ledger.fund_candidate(&p(FOUNDER1), 0, "2e".parse().unwrap()).unwrap();
    ledger.fund_candidate(&p(FOUNDER2), 1, "1e".parse().unwrap()).unwrap();

    ledger.advance_phase(&admin, Phase::Vote).unwrap();
    assert!(matches!(ledger.cast_vote(&p(0x51), 0), Err(LedgerError::DelayNotElapsed { .. })));
    clock.advance(VOTE_DELAY_SECS);

    ledger.cast_vote(&p(0x51), 0).unwrap();
    ledger.cast_vote(&p(0x52), 0).unwrap();
    ledger.cast_vote(&p(0x53), 1).unwrap();

    ledger.advance_phase(&admin, Phase::Completed).unwrap();
    let winner = ledger.get_winner().unwrap();
    assert_eq!(winner.name, "Alice");
    assert_eq!(winner.vote_count, 2);
    assert_eq!(winner.funds, Amount::ether(2));

    let mut sink = NullPayout::new();
    ledger.withdraw(&p(ALICE), 0, &mut sink).unwrap();
    ledger.withdraw(&p(BOB), 1, &mut sink).unwrap();
    assert_eq!(sink.balance_of(&p(ALICE)), Amount::ether(2));
    assert_eq!(sink.balance_of(&p(BOB)), Amount::ether(1));

    // Winner record reflects the withdrawal; the election result does not change.
    assert_eq!(ledger.get_winner().unwrap().funds, Amount::ZERO);
    assert_eq!(ledger.get_winner().unwrap().name, "Alice");
}

#[test]
fn audit_trail_matches_successful_calls() {
    let clock = Arc::new(NullClock::new(1_700_000_000));
    let mut ledger = deploy(clock.clone());
    let admin = p(DEPLOYER);
    let granted = ledger.events().len();

    ledger.add_candidate(&admin, "Alice", "", p(ALICE)).unwrap();
    ledger.add_candidate(&admin, "Bob", "", p(BOB)).unwrap();
    ledger.update_candidate(&admin, 1, "Robert", "renamed", p(BOB)).unwrap();
    ledger.delete_candidate(&admin, 0).unwrap();
    let _ = ledger.delete_candidate(&admin, 5);
    ledger.advance_phase(&admin, Phase::FoundCandidates).unwrap();
    ledger.fund_candidate(&p(FOUNDER1), 0, Amount::new(10)).unwrap();
    ledger.advance_phase(&admin, Phase::Vote).unwrap();
    clock.advance(VOTE_DELAY_SECS);
    ledger.cast_vote(&p(0x51), 0).unwrap();
    let _ = ledger.cast_vote(&p(0x51), 0);
    let mut sink = NullPayout::new();
    ledger.withdraw(&p(BOB), 0, &mut sink).unwrap();

    assert_eq!(
        &ledger.events()[granted..],
        &[
            ElectionEvent::CandidateAdded {
                name: "Alice".into(),
                description: "".into(),
                payout_address: p(ALICE),
            },
            ElectionEvent::CandidateAdded {
                name: "Bob".into(),
                description: "".into(),
                payout_address: p(BOB),
            },
            ElectionEvent::CandidateUpdated {
                index: 1,
                name: "Robert".into(),
                description: "renamed".into(),
                payout_address: p(BOB),
            },
            ElectionEvent::CandidateDeleted { index: 0 },
            ElectionEvent::PhaseChanged {
                phase: Phase::FoundCandidates
            },
            ElectionEvent::CandidateFunded {
                index: 0,
                funder: p(FOUNDER1),
                amount: Amount::new(10),
            },
            ElectionEvent::PhaseChanged { phase: Phase::Vote },
            ElectionEvent::Voted {
                voter: p(0x51),
                index: 0,
            },
            ElectionEvent::FundsWithdrawn {
                index: 0,
                amount: Amount::new(10),
            },
        ]
    );
}

#[test]
fn deleted_candidate_slot_is_taken_by_last() {
    let clock = Arc::new(NullClock::new(1_700_000_000));
    let mut ledger = deploy(clock);
    let admin = p(DEPLOYER);
    for (name, byte) in [("Alice", 1), ("Bob", 2), ("Charlie", 3)] {
        ledger.add_candidate(&admin, name, "", p(byte)).unwrap();
    }
    let charlie_id = ledger.get_candidate_details(2).unwrap().id;

    ledger.delete_candidate(&admin, 1).unwrap();

    assert_eq!(ledger.get_all_candidates().names, vec!["Alice", "Charlie"]);
    let moved = ledger.get_candidate_details(1).unwrap();
    assert_eq!(moved.id, charlie_id);
    assert_eq!(moved.payout_address, p(3));
}

#[test]
fn register_phase_cannot_be_reentered() {
    let clock = Arc::new(NullClock::new(1_700_000_000));
    let mut ledger = deploy(clock);
    let admin = p(DEPLOYER);
    for phase in [Phase::FoundCandidates, Phase::Vote, Phase::Completed] {
        ledger.advance_phase(&admin, phase).unwrap();
        assert!(ledger.advance_phase(&admin, Phase::RegisterCandidates).is_err());
    }
    assert_eq!(ledger.phase(), Phase::Completed);
}
