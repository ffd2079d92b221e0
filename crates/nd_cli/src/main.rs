use clap::Parser;
use nd_core::{ArticleQuery, ArticleStorage, Result, DEFAULT_LIST_LIMIT};
use nd_feeds::{
    handle_command, init_logging, HtmlExtractor, IngestArgs, IngestCommands, IngestConfig,
    IngestManager, RssFeedSource, MAX_RETENTION_DAYS,
};
use nd_inference::Summarizer;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_value = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if c.is_whitespace() {
                continue;
            } else {
                let num = current_number
                    .parse::<u64>()
                    .map_err(|_| format!("Expected a number before '{}'", c))?;
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration is too large".to_string())?;
                current_number.clear();
                has_value = true;
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            let secs = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(secs)
                .ok_or_else(|| "Duration is too large".to_string())?;
            has_value = true;
        }

        if !has_value {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Company news aggregator with deduplication", long_about = None)]
struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, env = "ND_STORAGE", default_value = "memory")]
    storage: String,
    /// SQLite database file
    #[arg(long, env = "ND_DB_PATH")]
    db_path: Option<String>,
    /// Groq API key; summaries fall back to a local extract without one
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, default_value = nd_inference::DEFAULT_MODEL_NAME)]
    model: String,
    /// Company to track, in priority order (repeatable). Defaults to Microsoft, Google, Apple, Meta.
    #[arg(long = "company")]
    companies: Vec<String>,
    /// Minimum gap between outbound fetch and summarize calls
    #[arg(long, default_value = "2s")]
    pacing: HumanDuration,
    #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(i64).range(1..=MAX_RETENTION_DAYS))]
    retention_days: i64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Ingest news, once or periodically
    Ingest {
        #[command(subcommand)]
        command: Option<IngestCommands>,
        /// Run in periodic mode with the specified interval (e.g. 1h, 30m, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: String,
    },
    /// Print stored articles, newest first
    List {
        #[arg(long)]
        company: Option<String>,
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },
}

impl Cli {
    fn ingest_config(&self) -> IngestConfig {
        let mut config = IngestConfig {
            pacing: self.pacing.0,
            retention_days: self.retention_days,
            ..IngestConfig::default()
        };
        if !self.companies.is_empty() {
            config.companies = self.companies.clone();
        }
        config
    }

    fn inference_config(&self) -> nd_inference::Config {
        nd_inference::Config {
            api_key: self.api_key.clone(),
            model_name: self.model.clone(),
            ..nd_inference::Config::default()
        }
    }
}

async fn build_manager(cli: &Cli, storage: Arc<dyn ArticleStorage>) -> Result<IngestManager> {
    let config = cli.ingest_config();
    let model = nd_inference::create_model(Some(cli.inference_config()))?;
    info!("🧠 Inference model initialized (using {})", model.name());

    let feed = RssFeedSource::new(&config.feed_url_template, config.request_timeout)?;
    let extractor = HtmlExtractor::new(
        config.request_timeout,
        config.min_content_chars,
        config.max_content_chars,
    )?;

    Ok(IngestManager::new(
        storage,
        Arc::new(feed),
        Arc::new(extractor),
        Summarizer::new(model),
        config,
    ))
}

/// Flips the returned receiver to `true` on Ctrl-C.
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("🛑 Ctrl-C received, finishing current article");
            let _ = tx.send(true);
        }
    });
    rx
}

async fn run_periodic(manager: &IngestManager, interval: Duration, mut shutdown: watch::Receiver<bool>) {
    info!("Running in periodic mode with {}s interval", interval.as_secs());
    loop {
        if let Err(e) = manager.ingest().await {
            error!(error = %e, "Ingestion cycle failed");
        }
        if *shutdown.borrow() {
            break;
        }
        info!("Waiting {}s before next cycle", interval.as_secs());
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => break,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let storage = nd_storage::create_storage(&cli.storage, cli.db_path.as_deref()).await?;
    info!("💾 Storage initialized (using {})", cli.storage);

    match &cli.command {
        Commands::Ingest { command, interval } => {
            let shutdown = shutdown_signal();
            let manager = build_manager(&cli, storage).await?.with_shutdown(shutdown.clone());
            let command = command.clone().unwrap_or(IngestCommands::Run { companies: Vec::new() });

            match (command, interval) {
                (IngestCommands::Run { companies }, Some(interval)) if companies.is_empty() => {
                    run_periodic(&manager, interval.0, shutdown).await;
                }
                (command, _) => handle_command(IngestArgs { command }, &manager).await?,
            }
        }
        Commands::Serve { addr } => {
            let manager = build_manager(&cli, storage).await?;
            nd_web::serve(nd_web::AppState::new(Arc::new(manager)), addr).await?;
        }
        Commands::List { company, limit } => {
            let query = ArticleQuery {
                company: company.clone(),
                limit: *limit,
            };
            for article in storage.list_articles(&query).await? {
                println!(
                    "[{}] {} | {} | {}\n    {}\n    {}",
                    article.id,
                    article.published_at.format("%Y-%m-%d %H:%M"),
                    article.company,
                    article.source,
                    article.title,
                    article.url
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!("1h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(3600));
        assert_eq!("1h15m30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(4530));
        assert_eq!("1d 2h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(93_600));
        assert_eq!("45".parse::<HumanDuration>().unwrap().0, Duration::from_secs(45));
        assert!("".parse::<HumanDuration>().is_err());
        assert!("h".parse::<HumanDuration>().is_err());
        assert!("5w".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_human_duration_overflow_is_an_error() {
        assert_eq!(
            "999999999999999d".parse::<HumanDuration>().unwrap_err(),
            "Duration is too large"
        );
        assert!("18446744073709551615s 1s".parse::<HumanDuration>().is_err());
        assert!("18446744073709551615s1".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_retention_days_out_of_range_is_rejected() {
        for days in ["0", "-1", "36501", "99999999999999"] {
            assert!(Cli::try_parse_from(["nd", "--retention-days", days, "list"]).is_err(), "{}", days);
        }
        let cli = Cli::try_parse_from(["nd", "--retention-days", "36500", "list"]).unwrap();
        assert_eq!(cli.retention_days, MAX_RETENTION_DAYS);
    }

    #[test]
    fn test_cli_builds_ingest_config() {
        let cli = Cli::try_parse_from([
            "nd", "--company", "Nvidia", "--company", "AMD", "--pacing", "500ms", "ingest",
        ]);
        // "ms" is not a unit
        assert!(cli.is_err());

        let cli = Cli::try_parse_from([
            "nd", "--company", "Nvidia", "--company", "AMD", "--pacing", "5s", "--retention-days", "3", "ingest",
        ])
        .unwrap();
        let config = cli.ingest_config();
        assert_eq!(config.companies, vec!["Nvidia", "AMD"]);
        assert_eq!(config.pacing, Duration::from_secs(5));
        assert_eq!(config.retention_days, 3);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["nd", "list"]).unwrap();
        assert_eq!(cli.storage, "memory");
        assert_eq!(cli.ingest_config(), IngestConfig::default());
        match cli.command {
            Commands::List { company, limit } => {
                assert!(company.is_none());
                assert_eq!(limit, DEFAULT_LIST_LIMIT);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
