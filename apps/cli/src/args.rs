//! Command-line interface of the `ncr` tool.

use clap::{Parser, Subcommand};
use ncr_search::{ExecutionContext, QName};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ncr")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Index and search content repository nodes")]
pub struct Cli {
    /// Settings file; `ncr.toml` in the working directory is used when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Gate writes on the flag source, as service traffic does, instead of
    /// the NCR_SEARCH_INDEXING_DISABLED override
    #[arg(long, global = true)]
    pub service: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    #[must_use]
    pub const fn execution_context(&self) -> ExecutionContext {
        if self.service { ExecutionContext::Service } else { ExecutionContext::Administrative }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Index the nodes of a JSON file and print the resulting storages
    Reindex {
        /// JSON array of nodes
        #[arg(short, long)]
        input: PathBuf,

        /// Tenant the nodes belong to
        #[arg(short, long)]
        tenant: Option<String>,
    },
    /// Index the nodes of a JSON file, then run a query over them
    Search {
        /// JSON array of nodes
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        tenant: Option<String>,

        /// Restrict the search to these qnames (repeatable); all when omitted
        #[arg(short, long = "qname")]
        qnames: Vec<QName>,

        /// 1-based result page
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Results per page (1-100)
        #[arg(short = 'n', long, default_value_t = 25)]
        count: u32,

        /// Query text, e.g. `+status:published "hello world" -draft`
        #[arg(default_value = "")]
        query: String,
    },
    /// Print the value of a flag as the configured flag source sees it
    Flag {
        name: String,
    },
}
