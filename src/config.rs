use std::env;
use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;
use log::LevelFilter;

use crate::error::{Error, Result};

pub const PROD_URL: &str = "https://crash-stats.mozilla.com";
pub const STAGE_URL: &str = "https://crash-stats.allizom.org";

/// Target crash-stats deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Prod,
    Stage,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Prod => PROD_URL,
            Environment::Stage => STAGE_URL,
        }
    }
}

/// Where to send requests and how long to wait for them.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl Config {
    /// Resolves the environment's base URL, honouring `REPROCESS_BASE_URL`
    /// and `REPROCESS_TIMEOUT_SECONDS` overrides.
    pub fn new(environment: Environment) -> Result<Self> {
        let base_url = env::var("REPROCESS_BASE_URL")
            .unwrap_or_else(|_| environment.base_url().to_string());
        let timeout = match env::var("REPROCESS_TIMEOUT_SECONDS") {
            Ok(raw) => Some(parse_timeout(&raw)?),
            Err(_) => None,
        };

        Ok(Self::with_base_url(base_url, timeout))
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| Error::Configuration(format!("REPROCESS_TIMEOUT_SECONDS={:?}: {}", raw, e)))
}

pub fn setup_logging(
    verbose: bool,
    log_file: Option<&Path>,
) -> std::result::Result<(), fern::InitError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ))
        })
        .level(level)
        // reqwest and hyper are chatty at debug
        .level_for("hyper", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(std::io::stderr());

    if let Some(path) = log_file {
        logger = logger.chain(fern::log_file(path)?);
    }

    logger.apply()?;
    Ok(())
}
