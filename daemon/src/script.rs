//! JSON command scripts replayed against a ledger.
//!
//! A script is a JSON array of commands, each tagged by `"cmd"`:
//!
//! ```json
//! [
//!   {"cmd": "add", "caller": "0xad..", "name": "Alice", "payout_address": "0x01.."},
//!   {"cmd": "advance", "caller": "0xad..", "phase": "found_candidates"},
//!   {"cmd": "fund", "caller": "0xf0..", "index": 0, "amount": "2e"},
//!   {"cmd": "sleep", "secs": 3600},
//!   {"cmd": "winner"}
//! ]
//! ```
//!
//! Time only moves on `sleep`. Payouts go to an in-memory ledger of
//! recipient balances. A rejected command is reported and the replay
//! carries on with the next one, leaving the election untouched.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use election_ledger::{ElectionLedger, LedgerError, Role};
use election_nullables::{NullClock, NullPayout};
use election_types::{Amount, Phase, Principal, TypesError};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ScriptCommand {
    Advance {
        caller: Principal,
        phase: Phase,
    },
    Add {
        caller: Principal,
        name: String,
        #[serde(default)]
        description: String,
        payout_address: Principal,
    },
    Update {
        caller: Principal,
        index: usize,
        name: String,
        #[serde(default)]
        description: String,
        payout_address: Principal,
    },
    Delete {
        caller: Principal,
        index: usize,
    },
    /// `amount` accepts `"1500"`, `"1500wei"`, `"2e"` or `"1.5ether"`.
    Fund {
        caller: Principal,
        index: usize,
        amount: String,
    },
    Withdraw {
        caller: Principal,
        index: usize,
    },
    Vote {
        caller: Principal,
        index: usize,
    },
    Grant {
        caller: Principal,
        role: Role,
        principal: Principal,
    },
    Revoke {
        caller: Principal,
        role: Role,
        principal: Principal,
    },
    /// Make `principal` refuse every later payout.
    RefusePayments {
        principal: Principal,
    },
    Sleep {
        secs: u64,
    },
    Status,
    Candidates,
    Winner,
}

impl ScriptCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance { .. } => "advance",
            Self::Add { .. } => "add",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Fund { .. } => "fund",
            Self::Withdraw { .. } => "withdraw",
            Self::Vote { .. } => "vote",
            Self::Grant { .. } => "grant",
            Self::Revoke { .. } => "revoke",
            Self::RefusePayments { .. } => "refuse_payments",
            Self::Sleep { .. } => "sleep",
            Self::Status => "status",
            Self::Candidates => "candidates",
            Self::Winner => "winner",
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum StepError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Amount(#[from] TypesError),
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptCommand>, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn load_script(path: &Path) -> anyhow::Result<Vec<ScriptCommand>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read script {}", path.display()))?;
    parse_script(&content).with_context(|| format!("invalid script {}", path.display()))
}

/// Drives one ledger through script commands with a controllable clock.
pub struct ScriptRunner {
    ledger: ElectionLedger,
    clock: Arc<NullClock>,
    payouts: NullPayout,
}

impl ScriptRunner {
    /// `clock` must be the clock `ledger` was built or loaded with.
    pub fn new(ledger: ElectionLedger, clock: Arc<NullClock>) -> Self {
        Self {
            ledger,
            clock,
            payouts: NullPayout::new(),
        }
    }

    pub fn ledger(&self) -> &ElectionLedger {
        &self.ledger
    }

    pub fn payouts(&self) -> &NullPayout {
        &self.payouts
    }

    pub fn into_ledger(self) -> ElectionLedger {
        self.ledger
    }

    /// Replay `script`, returning one JSON record per emitted event,
    /// rejection or query result, in order.
    pub fn run(&mut self, script: &[ScriptCommand]) -> Result<Vec<Value>, serde_json::Error> {
        let mut report = Vec::new();
        for (step, command) in script.iter().enumerate() {
            let seen = self.ledger.events().len();
            let outcome = self.execute(command);
            for event in &self.ledger.events()[seen..] {
                report.push(serde_json::to_value(event)?);
            }
            match outcome {
                Ok(Some(value)) => report.push(value),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(step, command = command.name(), error = %e, "command rejected");
                    report.push(json!({
                        "event": "rejected",
                        "step": step,
                        "command": command.name(),
                        "error": e.to_string(),
                    }));
                }
            }
        }
        Ok(report)
    }

    fn execute(&mut self, command: &ScriptCommand) -> Result<Option<Value>, StepError> {
        let ledger = &mut self.ledger;
        match command {
            ScriptCommand::Advance { caller, phase } => {
                ledger.advance_phase(caller, *phase)?;
            }
            ScriptCommand::Add {
                caller,
                name,
                description,
                payout_address,
            } => {
                ledger.add_candidate(caller, name, description, *payout_address)?;
            }
            ScriptCommand::Update {
                caller,
                index,
                name,
                description,
                payout_address,
            } => {
                ledger.update_candidate(caller, *index, name, description, *payout_address)?;
            }
            ScriptCommand::Delete { caller, index } => {
                ledger.delete_candidate(caller, *index)?;
            }
            ScriptCommand::Fund {
                caller,
                index,
                amount,
            } => {
                let amount: Amount = amount.parse()?;
                ledger.fund_candidate(caller, *index, amount)?;
            }
            ScriptCommand::Withdraw { caller, index } => {
                ledger.withdraw(caller, *index, &mut self.payouts)?;
            }
            ScriptCommand::Vote { caller, index } => {
                ledger.cast_vote(caller, *index)?;
            }
            ScriptCommand::Grant {
                caller,
                role,
                principal,
            } => {
                ledger.grant_role(caller, *role, *principal)?;
            }
            ScriptCommand::Revoke {
                caller,
                role,
                principal,
            } => {
                ledger.revoke_role(caller, *role, principal)?;
            }
            ScriptCommand::RefusePayments { principal } => {
                self.payouts.reject(*principal);
            }
            ScriptCommand::Sleep { secs } => {
                self.clock.advance(*secs);
                tracing::debug!(secs, "clock advanced");
            }
            ScriptCommand::Status => {
                let status = ledger.voting_status();
                return Ok(Some(json!({
                    "event": "status",
                    "phase": ledger.phase(),
                    "is_open": status.is_open,
                    "seconds_remaining": status.seconds_remaining,
                })));
            }
            ScriptCommand::Candidates => {
                let all = ledger.get_all_candidates();
                return Ok(Some(json!({
                    "event": "candidates",
                    "names": all.names,
                    "descriptions": all.descriptions,
                    "vote_counts": all.vote_counts,
                })));
            }
            ScriptCommand::Winner => {
                let winner = ledger.get_winner()?;
                return Ok(Some(json!({
                    "event": "winner",
                    "name": winner.name,
                    "description": winner.description,
                    "vote_count": winner.vote_count,
                    "payout_address": winner.payout_address,
                    "funds": winner.funds,
                })));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use election_ledger::{AccessTable, UniquenessTokenIssuer};

    const ADMIN: &str = "0xadadadadadadadadadadadadadadadadadadadad";
    const FOUNDER1: &str = "0xf1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1";
    const FOUNDER2: &str = "0xf2f2f2f2f2f2f2f2f2f2f2f2f2f2f2f2f2f2f2f2";
    const ALICE: &str = "0x0101010101010101010101010101010101010101";
    const BOB: &str = "0x0202020202020202020202020202020202020202";

    fn runner() -> ScriptRunner {
        let admin: Principal = ADMIN.parse().unwrap();
        let mut access = AccessTable::with_admin(admin);
        access.grant(Role::Funder, FOUNDER1.parse().unwrap());
        access.grant(Role::Funder, FOUNDER2.parse().unwrap());
        let clock = Arc::new(NullClock::new(1_700_000_000));
        let mut ledger = ElectionLedger::new(
            Principal::repeat_byte(0x1e),
            UniquenessTokenIssuer::new(admin),
            access,
            clock.clone(),
        );
        ledger.grant_minter(&admin).unwrap();
        ScriptRunner::new(ledger, clock)
    }

    fn full_election() -> String {
        format!(
            r#"[
            {{"cmd": "add", "caller": "{ADMIN}", "name": "Alice", "description": "Experienced leader", "payout_address": "{ALICE}"}},
            {{"cmd": "add", "caller": "{ADMIN}", "name": "Bob", "description": "Innovative thinker", "payout_address": "{BOB}"}},
            {{"cmd": "advance", "caller": "{ADMIN}", "phase": "found_candidates"}},
            {{"cmd": "fund", "caller": "{FOUNDER1}", "index": 0, "amount": "2e"}},
            {{"cmd": "fund", "caller": "{FOUNDER2}", "index": 1, "amount": "1e"}},
            {{"cmd": "advance", "caller": "{ADMIN}", "phase": "vote"}},
            {{"cmd": "vote", "caller": "0x5151515151515151515151515151515151515151", "index": 0}},
            {{"cmd": "sleep", "secs": 3600}},
            {{"cmd": "vote", "caller": "0x5151515151515151515151515151515151515151", "index": 0}},
            {{"cmd": "vote", "caller": "0x5252525252525252525252525252525252525252", "index": 0}},
            {{"cmd": "vote", "caller": "0x5353535353535353535353535353535353535353", "index": 1}},
            {{"cmd": "advance", "caller": "{ADMIN}", "phase": "completed"}},
            {{"cmd": "winner"}}
        ]"#
        )
    }

    #[test]
    fn replays_full_election() {
        let mut runner = runner();
        let script = parse_script(&full_election()).unwrap();
        let report = runner.run(&script).unwrap();

        let kinds: Vec<&str> = report.iter().filter_map(|r| r["event"].as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "candidate_added",
                "candidate_added",
                "phase_changed",
                "candidate_funded",
                "candidate_funded",
                "phase_changed",
                "rejected",
                "voted",
                "voted",
                "voted",
                "phase_changed",
                "winner",
            ]
        );
        assert_eq!(report[6]["command"], "vote");
        let winner = report.last().unwrap();
        assert_eq!(winner["name"], "Alice");
        assert_eq!(winner["vote_count"], 2);
        assert_eq!(runner.ledger().phase(), Phase::Completed);
    }

    #[test]
    fn refused_payment_keeps_balance() {
        let mut runner = runner();
        let script = parse_script(&format!(
            r#"[
            {{"cmd": "add", "caller": "{ADMIN}", "name": "Alice", "payout_address": "{ALICE}"}},
            {{"cmd": "advance", "caller": "{ADMIN}", "phase": "found_candidates"}},
            {{"cmd": "fund", "caller": "{FOUNDER1}", "index": 0, "amount": "1500"}},
            {{"cmd": "refuse_payments", "principal": "{ALICE}"}},
            {{"cmd": "withdraw", "caller": "{ALICE}", "index": 0}}
        ]"#
        ))
        .unwrap();
        let report = runner.run(&script).unwrap();

        assert_eq!(report.last().unwrap()["event"], "rejected");
        assert_eq!(
            runner.ledger().get_candidate_details(0).unwrap().funds,
            Amount::new(1500)
        );
        assert!(runner.payouts().transfers().is_empty());
    }

    #[test]
    fn bad_amount_is_reported_not_fatal() {
        let mut runner = runner();
        let script = parse_script(&format!(
            r#"[
            {{"cmd": "add", "caller": "{ADMIN}", "name": "Alice", "payout_address": "{ALICE}"}},
            {{"cmd": "advance", "caller": "{ADMIN}", "phase": "found_candidates"}},
            {{"cmd": "fund", "caller": "{FOUNDER1}", "index": 0, "amount": "lots"}},
            {{"cmd": "candidates"}}
        ]"#
        ))
        .unwrap();
        let report = runner.run(&script).unwrap();
        assert_eq!(report[2]["event"], "rejected");
        assert_eq!(report[3]["names"], json!(["Alice"]));
    }

    #[test]
    fn unknown_command_fails_to_parse() {
        assert!(parse_script(r#"[{"cmd": "rig_election"}]"#).is_err());
        assert!(parse_script(r#"[{"cmd": "vote", "index": 0}]"#).is_err());
    }
}
