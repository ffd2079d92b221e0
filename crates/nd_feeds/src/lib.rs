pub mod cli;
pub mod config;
pub mod extractor;
pub mod feeds;
pub mod logging;
pub mod manager;
pub mod throttle;

pub use cli::{handle_command, IngestArgs, IngestCommands};
pub use config::{IngestConfig, BING_NEWS_RSS, DEFAULT_COMPANIES, MAX_RETENTION_DAYS};
pub use extractor::{extract_text, HtmlExtractor};
pub use feeds::{parse_feed, RssFeedSource};
pub use logging::init_logging;
pub use manager::{CandidateOutcome, IngestManager, IngestReport, Rejection};
pub use throttle::{Throttle, ThrottlePermit};

pub mod prelude {
    pub use super::{IngestConfig, IngestManager, IngestReport, Throttle};
    pub use nd_core::{ContentExtractor, Error, FeedSource, Result};
}
