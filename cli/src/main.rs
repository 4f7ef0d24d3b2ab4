//! carefind: care facility records from the command line.
//!
//! Facilities live in `facilities.json` under the data directory; every
//! change rewrites the whole snapshot. Live information comes from the
//! simulated web collaborators in `carefind-live`.
//!
//! Usage:
//!   carefind add --name さくら苑 --address 札幌市中央区1-1 --care-level 要介護3
//!   carefind search --area 中央区 --availability available --sort reliability
//!   carefind import 介護施設一覧.csv
//!   carefind profile set --name 田中 --care-level 要介護2 --medical-needs 胃ろう
//!   carefind watch --minutes 30

mod args;
mod commands;
mod config;
mod render;

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use carefind_contracts::{error::CarefindResult, taxonomy::ConfirmationMethod};
use carefind_core::{traits::FacilityRepository, FacilityStore};
use carefind_storage::{InMemoryRepository, JsonFileRepository};

use args::{parse_date, parse_method, ExportArgs, FacilityFields, ProfileCommand, SearchArgs};
use commands::App;
use config::AppConfig;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Manage, score and refresh care facility records.
#[derive(Parser)]
#[command(name = "carefind", version, about = "Care facility records with recommendation scores")]
struct Cli {
    /// carefind.toml with [storage], [scoring] and [live] sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where facilities.json and profile.json are kept.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing is read or written on disk.
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// List facilities by recommendation score.
    List {
        /// Include hidden facilities.
        #[arg(long)]
        all: bool,
    },
    /// Filter and sort facilities.
    Search(SearchArgs),
    /// List hidden facilities.
    Hidden,
    /// Print every field of one facility.
    Show { facility: String },
    /// Add a facility. Name and address are required.
    Add {
        #[command(flatten)]
        fields: FacilityFields,
        /// Pre-fill availability and reviews from --website.
        #[arg(long)]
        from_web: bool,
    },
    /// Change fields of a facility.
    Edit {
        facility: String,
        #[command(flatten)]
        fields: FacilityFields,
    },
    /// Delete one facility, or all of them with --all.
    Delete {
        facility: Option<String>,
        #[arg(long, conflicts_with = "facility")]
        all: bool,
    },
    /// Hide a facility from regular views.
    Hide { facility: String },
    /// Show a hidden facility again (first name match), or all with --all.
    Unhide {
        fragment: Option<String>,
        #[arg(long, conflicts_with = "fragment")]
        all: bool,
    },
    /// Record that a facility's data was confirmed.
    Confirm {
        facility: String,
        #[arg(long, value_parser = parse_method, default_value = "phone")]
        method: ConfirmationMethod,
        /// Defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Adopt the fetched web information as the facility's recorded data.
    AdoptWeb { facility: String },
    /// Merge a CSV file (UTF-8 or Shift_JIS) into the store.
    Import { file: PathBuf },
    /// Write the filtered, sorted facility list to a CSV file.
    Export(ExportArgs),
    /// Manage the patient profile.
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Fetch live information for one facility, or every facility with a website.
    Refresh { facility: Option<String> },
    /// Re-read the web for every medium-reliability facility.
    BulkUpdate,
    /// Extract facilities from a newline-separated list of URLs.
    BulkUrls {
        file: PathBuf,
        /// Add the extracted facilities to the store.
        #[arg(long)]
        save: bool,
    },
    /// Refresh live information periodically until Ctrl-C.
    Watch {
        /// Overrides [live] auto_refresh_minutes.
        #[arg(long)]
        minutes: Option<u64>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("carefind: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CarefindResult<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    let repo: Box<dyn FacilityRepository> = if cli.ephemeral {
        debug!("using in-memory storage");
        Box::new(InMemoryRepository::new())
    } else {
        Box::new(JsonFileRepository::open(config.data_dir(cli.data_dir.as_deref()))?)
    };
    let store = FacilityStore::open(repo, &config.scoring)?;
    let mut app = App::new(store, &config);

    commands::execute(&mut app, cli.command, Utc::now()).await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["carefind", "list", "--ephemeral", "--data-dir", "/tmp/x"]).unwrap();
        assert!(cli.ephemeral);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Command::List { all: false }));
    }

    #[test]
    fn parses_facility_fields() {
        let cli = Cli::try_parse_from([
            "carefind",
            "add",
            "--name",
            "さくら苑",
            "--address",
            "札幌市中央区",
            "--care-level",
            "要介護1",
            "--care-level",
            "care-2",
            "--availability",
            "空きあり",
        ])
        .unwrap();
        let Command::Add { fields, from_web } = cli.command else {
            panic!("expected add");
        };
        assert!(!from_web);
        assert_eq!(fields.care_levels.len(), 2);
        assert_eq!(fields.name.as_deref(), Some("さくら苑"));
    }

    #[test]
    fn confirm_defaults_to_phone() {
        let cli = Cli::try_parse_from(["carefind", "confirm", "さくら苑"]).unwrap();
        let Command::Confirm { method, date, .. } = cli.command else {
            panic!("expected confirm");
        };
        assert_eq!(method, ConfirmationMethod::Phone);
        assert_eq!(date, None);
    }

    #[test]
    fn delete_all_conflicts_with_name() {
        assert!(Cli::try_parse_from(["carefind", "delete", "A", "--all"]).is_err());
        assert!(Cli::try_parse_from(["carefind", "profile", "set"]).is_err());
    }
}
