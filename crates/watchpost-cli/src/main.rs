//! Command-line front end for the Watchpost incident store.
//!
//! # Usage
//!
//! ```text
//! watchpost init
//! watchpost register alice --role analyst
//! watchpost incident add --type Phishing --severity High "User received a phishing email"
//! watchpost load DATA/it_tickets.csv --table tickets
//! watchpost seed DATA
//! watchpost stats --json
//! ```
//!
//! Every invocation opens the database, runs one command and closes it.

mod settings;

use std::{
  io::{self, BufRead, Write},
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use settings::{DEFAULT_CONFIG_FILE, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use watchpost_auth::{
  Argon2Digester, AuthGateway,
  credentials::{validate_password, validate_username},
};
use watchpost_core::{
  record::{DEFAULT_ROLE, NewIncident},
  schema::Table,
  store::RecordStore,
};
use watchpost_store_sqlite::{IngestReport, IngestSkip, SqliteStore};

/// File names `seed` looks for, and the table each one feeds.
const SEED_FILES: [(&str, Table); 3] = [
  ("cyber_incidents.csv", Table::Incidents),
  ("datasets_metadata.csv", Table::DatasetMetadata),
  ("it_tickets.csv", Table::Tickets),
];

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "watchpost", version, about = "Incident, ticket and dataset store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
  config: PathBuf,

  /// SQLite database file; overrides the configured `database_path`.
  #[arg(long, env = "WATCHPOST_DATABASE")]
  database: Option<PathBuf>,

  /// Print listings and reports as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create any missing tables.
  Init,

  /// Register a new user.
  Register {
    username: String,
    #[arg(long, default_value = DEFAULT_ROLE)]
    role:     String,
    /// Read from stdin when omitted.
    #[arg(long, env = "WATCHPOST_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },

  /// Check a username and password.
  Login {
    username: String,
    #[arg(long, env = "WATCHPOST_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },

  /// Create, list, update or delete incidents.
  #[command(subcommand)]
  Incident(IncidentCommand),

  /// Load a CSV file into a table.
  Load {
    file:  PathBuf,
    /// Target table: incidents, dataset-metadata or tickets.
    #[arg(short, long, value_parser = parse_table)]
    table: Table,
  },

  /// Load the standard incident, dataset and ticket files from a directory.
  Seed {
    /// Defaults to the configured `data_dir`.
    dir: Option<PathBuf>,
  },

  /// Incident counts by type, and high/critical incidents by status.
  Stats,

  /// List ingested tickets.
  Tickets,

  /// List ingested dataset metadata.
  Datasets,
}

#[derive(Subcommand)]
enum IncidentCommand {
  Add {
    description:   String,
    #[arg(long = "type")]
    incident_type: String,
    #[arg(long)]
    severity:      String,
    #[arg(long, default_value = "Open")]
    status:        String,
    /// Date reported; defaults to today.
    #[arg(long)]
    date:          Option<String>,
    #[arg(long)]
    reported_by:   Option<String>,
  },
  List,
  UpdateStatus {
    id:     i64,
    status: String,
  },
  Delete {
    id: i64,
  },
}

fn parse_table(s: &str) -> Result<Table, String> {
  let table = Table::parse(s).map_err(|e| e.to_string())?;
  if !table.is_ingestible() {
    return Err(format!("table {table} cannot be loaded from CSV"));
  }
  Ok(table)
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
  // Logs go to stderr so `--json` output on stdout stays parseable.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let mut settings = Settings::load(&cli.config)?;
  if let Some(db) = cli.database {
    settings.database_path = db;
  }

  let store = SqliteStore::open(&settings.database_path).with_context(|| {
    format!("failed to open store at {}", settings.database_path.display())
  })?;

  let code = run(&store, &settings, cli.command, cli.json)?;
  store.close().context("failed to close store")?;
  Ok(code)
}

fn run(store: &SqliteStore, settings: &Settings, command: Command, json: bool) -> Result<ExitCode> {
  match command {
    Command::Init => {
      store.ensure_schema()?;
      println!("Schema ready at {}", settings.database_path.display());
      for table in Table::all() {
        println!("  {:<18} {} rows", table.name(), store.count(table)?);
      }
    }

    Command::Register { username, role, password } => {
      if let Err(e) = validate_username(&username) {
        eprintln!("Error: {e}");
        return Ok(ExitCode::FAILURE);
      }
      let password = password_or_stdin(password)?;
      if let Err(e) = validate_password(&password) {
        eprintln!("Error: {e}");
        return Ok(ExitCode::FAILURE);
      }

      let gateway = AuthGateway::new(store, Argon2Digester::default());
      let outcome = gateway.register(&username, &password, &role)?;
      println!("{outcome}");
      if !outcome.is_success() {
        return Ok(ExitCode::FAILURE);
      }
    }

    Command::Login { username, password } => {
      let password = password_or_stdin(password)?;
      let gateway = AuthGateway::new(store, Argon2Digester::default());
      let outcome = gateway.login(&username, &password)?;
      println!("{outcome}");
      if !outcome.is_success() {
        return Ok(ExitCode::FAILURE);
      }
    }

    Command::Incident(cmd) => return run_incident(store, cmd, json),

    Command::Load { file, table } => {
      let report = store.load_csv(&file, table)?;
      print_report(&report, json)?;
    }

    Command::Seed { dir } => {
      let dir = dir.unwrap_or_else(|| settings.data_dir.clone());
      let files: Vec<(PathBuf, Table)> = SEED_FILES
        .iter()
        .map(|(name, table)| (dir.join(name), *table))
        .collect();

      let mut failed = false;
      for ((path, _), result) in files.iter().zip(store.load_many(&files)) {
        match result {
          Ok(report) => print_report(&report, json)?,
          Err(e) => {
            eprintln!("Error: failed to load {}: {e}", path.display());
            failed = true;
          }
        }
      }
      if failed {
        return Ok(ExitCode::FAILURE);
      }
    }

    Command::Stats => {
      let by_type = store.incident_counts_by_type()?;
      let by_status = store.high_severity_by_status()?;
      if json {
        #[derive(Serialize)]
        struct Stats<T, S> {
          by_type:                 T,
          high_severity_by_status: S,
        }
        print_json(&Stats { by_type, high_severity_by_status: by_status })?;
      } else {
        println!("Incidents by type:");
        for row in by_type {
          println!("  {:<24} {}", row.incident_type, row.count);
        }
        println!("High/critical incidents by status:");
        for row in by_status {
          println!("  {:<24} {}", row.status.as_deref().unwrap_or("-"), row.count);
        }
      }
    }

    Command::Tickets => {
      let tickets = store.list_tickets()?;
      if json {
        print_json(&tickets)?;
      } else {
        for t in tickets {
          println!(
            "#{:<6} {:<10} {}",
            t.id,
            t.status.as_deref().unwrap_or("-"),
            t.issue
          );
        }
      }
    }

    Command::Datasets => {
      let datasets = store.list_datasets()?;
      if json {
        print_json(&datasets)?;
      } else {
        for d in datasets {
          println!(
            "#{:<6} {:<28} rows={:<8} category={}",
            d.id,
            d.dataset_name,
            d.record_count.map_or_else(|| "-".to_owned(), |n| n.to_string()),
            d.category.as_deref().unwrap_or("-")
          );
        }
      }
    }
  }

  Ok(ExitCode::SUCCESS)
}

fn run_incident(store: &SqliteStore, cmd: IncidentCommand, json: bool) -> Result<ExitCode> {
  match cmd {
    IncidentCommand::Add {
      description,
      incident_type,
      severity,
      status,
      date,
      reported_by,
    } => {
      let incident = NewIncident {
        date: date.unwrap_or_else(|| chrono::Local::now().date_naive().to_string()),
        incident_type,
        severity,
        status,
        description,
        reported_by,
      };
      let id = store.insert_incident(&incident)?;
      println!("Inserted incident ID: {id}");
    }

    IncidentCommand::List => {
      let incidents = store.list_incidents()?;
      if json {
        print_json(&incidents)?;
      } else {
        for i in incidents {
          println!(
            "#{:<6} {:<12} {:<16} {:<9} {:<10} {}",
            i.id,
            i.date_reported.as_deref().unwrap_or("-"),
            i.incident_type,
            i.severity.as_deref().unwrap_or("-"),
            i.status.as_deref().unwrap_or("-"),
            i.description.as_deref().unwrap_or("")
          );
        }
      }
    }

    IncidentCommand::UpdateStatus { id, status } => {
      let updated = store.update_incident_status(id, &status)?;
      println!("Updated rows: {updated}");
      if updated == 0 {
        eprintln!("No incident with ID {id}");
        return Ok(ExitCode::FAILURE);
      }
    }

    IncidentCommand::Delete { id } => {
      let deleted = store.delete_incident(id)?;
      println!("Deleted rows: {deleted}");
      if deleted == 0 {
        eprintln!("No incident with ID {id}");
        return Ok(ExitCode::FAILURE);
      }
    }
  }

  Ok(ExitCode::SUCCESS)
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn print_report(report: &IngestReport, json: bool) -> Result<()> {
  if json {
    #[derive(Serialize)]
    struct Report<'a> {
      path:            &'a Path,
      table:           Table,
      rows_loaded:     usize,
      dropped_columns: &'a [String],
      skipped:         Option<&'static str>,
    }
    return print_json(&Report {
      path:            &report.path,
      table:           report.table,
      rows_loaded:     report.rows_loaded,
      dropped_columns: &report.dropped_columns,
      skipped:         report.skipped.map(skip_reason),
    });
  }

  let file = report.path.display();
  match report.skipped {
    Some(reason) => println!("Skipped {file}: {}", skip_reason(reason)),
    None => println!(
      "Loaded {} rows into '{}' from {file}",
      report.rows_loaded, report.table
    ),
  }
  Ok(())
}

fn skip_reason(reason: IngestSkip) -> &'static str {
  match reason {
    IngestSkip::FileNotFound => "file not found",
    IngestSkip::NoMatchingColumns => "no matching columns",
  }
}

/// Read a password from stdin when one was not passed on the command line.
fn password_or_stdin(password: Option<String>) -> Result<String> {
  if let Some(p) = password {
    return Ok(p);
  }
  let stdin = io::stdin();
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
