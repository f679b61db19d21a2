use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "intelfuse", about = "Event deduplication, fusion and ranking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import events from a JSON array or NDJSON file
    Import {
        /// Path to the input file
        path: String,
    },
    /// Group ungrouped recent events (or the given ids) into clusters
    Cluster {
        #[arg(long, default_value = "24")]
        hours: u32,
        /// Comma-separated event ids; overrides --hours
        #[arg(long, value_delimiter = ',')]
        ids: Option<Vec<String>>,
    },
    /// Fuse the stored members of one cluster
    Fuse {
        cluster_id: String,
    },
    /// Cluster, fuse and rank in one pass
    Run {
        #[arg(long, default_value = "24")]
        hours: u32,
        #[arg(long, value_delimiter = ',')]
        ids: Option<Vec<String>>,
    },
    /// Rank stored events by priority
    Rank {
        #[arg(long, default_value = "24")]
        hours: u32,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Score a single event given as JSON, without storing it
    Score {
        json: String,
    },
    /// Show database statistics
    Stats,
}
