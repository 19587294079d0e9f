//! `recstore` command-line entry point.
//!
//! # Responsibility
//! - Expose `create` / `get` over whichever backend is configured.
//! - Keep output machine-readable: records print as one JSON line.
//!
//! Configuration precedence: flags, then `RECSTORE_*` env vars, then defaults.

use clap::{Parser, Subcommand};
use log::debug;
use recstore_core::{
    init_logging, open_store, BackendKind, Car, LogConfig, LogTarget, Record, RecordId,
    RecordStore, StoreConfig, User,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "recstore")]
#[command(about = "Create and look up user/car records in CSV or SQLite storage", long_about = None)]
struct Cli {
    /// Storage backend: csv or sqlite
    #[arg(long, global = true)]
    backend: Option<BackendKind>,
    /// Directory holding the CSV files or the SQLite database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// Absolute directory for rotating log files (stderr when omitted)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert or overwrite a record given as tagged JSON
    Create {
        /// e.g. '{"kind":"user","id":1,"name":"John","age":20}'
        record: String,
    },
    /// Print the record of KIND with ID as JSON
    Get {
        /// user or car
        kind: String,
        /// Record id
        id: RecordId,
    },
    /// Write a few sample records and read them back
    Demo,
    /// Print the core version
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let target = match cli.log_dir {
        Some(dir) => LogTarget::Directory(dir),
        None => LogTarget::Stderr,
    };
    init_logging(&LogConfig::new(&cli.log_level, target)?)?;

    if let Commands::Version = cli.command {
        println!("recstore_core version={}", recstore_core::core_version());
        return Ok(());
    }

    let mut config = StoreConfig::from_env()?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    let store = open_store(&config)?;

    match cli.command {
        Commands::Create { record } => {
            let value: serde_json::Value = serde_json::from_str(&record)?;
            store.create_value(&value)?;
            debug!("event=cli_create module=cli status=ok backend={}", store.backend_name());
        }
        Commands::Get { kind, id } => {
            let record = store.get_named(id, &kind)?;
            println!("{}", serde_json::to_string(&record)?);
        }
        Commands::Demo => run_demo(&*store)?,
        Commands::Version => {}
    }
    Ok(())
}

fn run_demo(store: &dyn RecordStore) -> Result<(), Box<dyn Error>> {
    let car = Record::from(Car::new(4, "blue", "toyota", "corolla"));
    let user = Record::from(User::new(2, "Bob", 40));
    let user_2 = Record::from(User::new(2, "Alice", 30));

    store.create(&user)?;
    store.create(&user_2)?;
    store.create(&car)?;

    println!("{} store", store.backend_name());
    println!("user --> {}", serde_json::to_string(&store.get_named(2, "user")?)?);
    println!("car --> {}", serde_json::to_string(&store.get_named(4, "car")?)?);
    Ok(())
}
