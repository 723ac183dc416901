use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "transkribus")]
#[command(about = "Upload and download documents with the Transkribus REST API")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log line layout
    #[arg(long, global = true, value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    /// Also append log output to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Transkribus user name
    #[arg(short, long, env = "TRANSKRIBUS_USERNAME")]
    pub username: String,

    /// Transkribus password
    #[arg(short, long, env = "TRANSKRIBUS_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// REST API base URL
    #[arg(long, env = "TRANSKRIBUS_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// HTTP request timeout in seconds; none by default
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a document to a collection
    UploadDocument {
        /// Collection to upload to
        #[arg(short, long)]
        collection_id: i64,

        /// Document title
        #[arg(short, long)]
        title: String,

        /// Images and PAGE-XML files, or directories containing them
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },

    /// Download a document's METS manifest and PAGE-XML transcripts
    DownloadDocument {
        #[arg(short, long)]
        collection_id: i64,

        #[arg(short, long)]
        document_id: i64,

        /// Target directory, created if missing
        #[arg(short, long, default_value = ".", value_name = "DIR")]
        output: PathBuf,
    },

    /// List the collections you have access to
    ListCollections {
        /// Only collections whose name matches
        #[arg(long)]
        filter: Option<String>,
    },

    /// List your jobs
    ListJobs {
        /// Only jobs in this collection
        #[arg(short, long)]
        collection_id: Option<i64>,

        /// Only jobs with this state, e.g. RUNNING
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    Compact,
    Full,
    Pretty,
}
