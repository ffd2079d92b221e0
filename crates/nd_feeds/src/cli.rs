use clap::{Args, Subcommand};
use nd_core::Result;
use nd_dedup::{canonicalize, normalize, ratio, DEFAULT_SIMILARITY_THRESHOLD};

use crate::manager::{IngestManager, IngestReport};

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[command(subcommand)]
    pub command: IngestCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum IngestCommands {
    /// Run one ingestion cycle
    Run {
        /// Companies to ingest, in priority order. Defaults to the configured list.
        companies: Vec<String>,
    },
    /// List the configured companies
    Companies,
    /// Show the dedup keys derived from a title and a URL
    Keys {
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
    },
    /// Compare two titles the way in-batch dedup does
    Compare {
        a: String,
        b: String,
        #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: f64,
    },
}

pub async fn handle_command(args: IngestArgs, manager: &IngestManager) -> Result<()> {
    match args.command {
        IngestCommands::Run { companies } => {
            let report = if companies.is_empty() {
                manager.ingest().await?
            } else {
                manager.ingest_cycle(&companies).await?
            };
            print_report(&report)?;
        }
        IngestCommands::Companies => {
            println!("Configured companies:");
            for company in &manager.config().companies {
                println!("  {}", company);
            }
        }
        IngestCommands::Keys { title, url } => {
            println!("title_norm: {}", normalize(&title));
            println!("url_norm:   {}", canonicalize(&url));
        }
        IngestCommands::Compare { a, b, threshold } => {
            let (a, b) = (normalize(&a), normalize(&b));
            let score = ratio(&a, &b);
            let verdict = if score >= threshold { "🔁 duplicate" } else { "🆕 distinct" };
            println!("{:.4} {} ({:?} vs {:?})", score, verdict, a, b);
        }
    }
    Ok(())
}

pub fn print_report(report: &IngestReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
