use clap::Parser;
use intelfuse::application::cluster::WorkingSet;
use intelfuse::cli::commands::{Cli, Commands};
use intelfuse::domain::entities::event::RawEvent;
use intelfuse::domain::values::cluster_id::ClusterId;
use intelfuse::infrastructure::config::Settings;
use intelfuse::IntelFuse;
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("intelfuse=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    let fuse = match IntelFuse::new(&settings) {
        Ok(fuse) => fuse,
        Err(e) => {
            eprintln!("Error initializing intelfuse: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(fuse, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(fuse: IntelFuse, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Import { path } => {
            let report = fuse.import_file(Path::new(&path))?;
            print_json(&report)?;
        }
        Commands::Cluster { hours, ids } => {
            let run = fuse.cluster(&working_set(hours, ids))?;
            print_json(&run)?;
        }
        Commands::Fuse { cluster_id } => {
            let record = fuse.fuse(&ClusterId::new(cluster_id))?;
            print_json(&record)?;
        }
        Commands::Run { hours, ids } => {
            let report = fuse.run(working_set(hours, ids)).await?;
            print_json(&report)?;
        }
        Commands::Rank { hours, limit } => {
            let items = fuse.rank(hours, limit)?;
            print_json(&items)?;
        }
        Commands::Score { json } => {
            let raw: RawEvent = serde_json::from_str(&json)?;
            let item = fuse.score(raw)?;
            print_json(&item)?;
        }
        Commands::Stats => {
            let stats = fuse.stats()?;
            print_json(&stats)?;
        }
    }
    Ok(())
}

fn working_set(hours: u32, ids: Option<Vec<String>>) -> WorkingSet {
    match ids {
        Some(ids) if !ids.is_empty() => WorkingSet::Ids(ids),
        _ => WorkingSet::Recent { hours_back: hours },
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
