//! `election`: command-line driver for an election ledger.

mod config;
mod script;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use election_ledger::{ElectionLedger, UniquenessTokenIssuer};
use election_nullables::NullClock;
use election_types::{Principal, Timestamp};
use election_utils::LogFormat;

use crate::config::DaemonConfig;
use crate::script::ScriptRunner;

#[derive(Parser)]
#[command(name = "election", about = "Election ledger driver")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, global = true, env = "ELECTION_CONFIG")]
    config: Option<PathBuf>,

    /// Ledger identity (0x-prefixed 20-byte address).
    #[arg(long, global = true, env = "ELECTION_LEDGER_ID")]
    ledger_id: Option<Principal>,

    /// Snapshot file the election state is loaded from and saved to.
    #[arg(long, global = true, env = "ELECTION_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "ELECTION_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "ELECTION_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a JSON command script and print every event as a JSON line.
    Run {
        #[arg(long)]
        script: PathBuf,
    },
    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    fn effective_config(&self) -> anyhow::Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)?,
            None => DaemonConfig::default(),
        };
        if let Some(id) = self.ledger_id {
            config.ledger_id = id;
        }
        if let Some(path) = &self.snapshot {
            config.snapshot_path = Some(path.clone());
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.effective_config()?;
    election_utils::init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Run { script } => run_script(&config, &script)?,
    }
    Ok(())
}

fn run_script(config: &DaemonConfig, script_path: &Path) -> anyhow::Result<()> {
    let script = script::load_script(script_path)?;
    let start = config.start_time.unwrap_or_else(|| Timestamp::now().as_secs());
    let clock = Arc::new(NullClock::new(start));

    let ledger = match &config.snapshot_path {
        Some(path) if path.exists() => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("cannot read snapshot {}", path.display()))?;
            let ledger = ElectionLedger::load_state(&bytes, clock.clone())?;
            if ledger.id() != config.ledger_id {
                anyhow::bail!(
                    "snapshot belongs to ledger {}, configured ledger is {}",
                    ledger.id(),
                    config.ledger_id
                );
            }
            ledger
        }
        _ => deploy(config, clock.clone())?,
    };

    tracing::info!(
        ledger = %ledger.id(),
        phase = %ledger.phase(),
        commands = script.len(),
        "replaying script"
    );
    let mut runner = ScriptRunner::new(ledger, clock);
    for line in runner.run(&script)? {
        println!("{line}");
    }
    tracing::info!(
        phase = %runner.ledger().phase(),
        events = runner.ledger().events().len(),
        "script finished"
    );
    for (recipient, amount) in runner.payouts().transfers() {
        tracing::info!(%recipient, %amount, "payout delivered");
    }

    if let Some(path) = &config.snapshot_path {
        let bytes = runner.into_ledger().save_state()?;
        std::fs::write(path, bytes)
            .with_context(|| format!("cannot write snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), "snapshot saved");
    }
    Ok(())
}

/// A fresh election: the first admin owns the token issuer and hands its
/// minter capability to the ledger.
fn deploy(config: &DaemonConfig, clock: Arc<NullClock>) -> anyhow::Result<ElectionLedger> {
    let (owner, access) = config.access_table()?;
    let mut ledger = ElectionLedger::new(
        config.ledger_id,
        UniquenessTokenIssuer::new(owner),
        access,
        clock,
    );
    ledger.grant_minter(&owner)?;
    tracing::info!(ledger = %config.ledger_id, %owner, "election deployed");
    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: &str = "0xadadadadadadadadadadadadadadadadadadadad";
    const ALICE: &str = "0x0101010101010101010101010101010101010101";

    fn config_with_snapshot(dir: &Path) -> DaemonConfig {
        DaemonConfig {
            admins: vec![ADMIN.parse().unwrap()],
            snapshot_path: Some(dir.join("state.bin")),
            start_time: Some(1_000),
            ..Default::default()
        }
    }

    #[test]
    fn cli_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"log_level = \"warn\"\nlog_format = \"json\"\n").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from(["election", "--config", &path, "--log-level", "debug", "config"]);
        let config = cli.effective_config().unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn state_survives_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_snapshot(dir.path());

        let first = dir.path().join("first.json");
        std::fs::write(
            &first,
            format!(
                r#"[{{"cmd": "add", "caller": "{ADMIN}", "name": "Alice", "payout_address": "{ALICE}"}},
                    {{"cmd": "advance", "caller": "{ADMIN}", "phase": "found_candidates"}}]"#
            ),
        )
        .unwrap();
        run_script(&config, &first).unwrap();

        let bytes = std::fs::read(dir.path().join("state.bin")).unwrap();
        let clock = Arc::new(NullClock::new(1_000));
        let ledger = ElectionLedger::load_state(&bytes, clock).unwrap();
        assert_eq!(ledger.phase(), election_types::Phase::FoundCandidates);
        assert_eq!(ledger.get_all_candidates().names, vec!["Alice"]);
    }

    #[test]
    fn snapshot_of_other_ledger_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_with_snapshot(dir.path());
        let script = dir.path().join("empty.json");
        std::fs::write(&script, "[]").unwrap();
        run_script(&config, &script).unwrap();

        config.ledger_id = Principal::repeat_byte(0x99);
        assert!(run_script(&config, &script).is_err());
    }

    #[test]
    fn deploy_requires_admin() {
        let clock = Arc::new(NullClock::new(0));
        assert!(deploy(&DaemonConfig::default(), clock).is_err());
    }
}
