//! Service configuration.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use stockledger_products::{BackoffStrategy, RetryPolicy};

pub const ENV_RETRY_MAX_ATTEMPTS: &str = "STOCKLEDGER_RETRY_MAX_ATTEMPTS";
pub const ENV_RETRY_BASE_DELAY_MS: &str = "STOCKLEDGER_RETRY_BASE_DELAY_MS";
pub const ENV_RETRY_MAX_DELAY_MS: &str = "STOCKLEDGER_RETRY_MAX_DELAY_MS";
pub const ENV_RETRY_STRATEGY: &str = "STOCKLEDGER_RETRY_STRATEGY";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Retry policy for optimistic stock adjustments.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl ReconciliationConfig {
    /// Defaults overridden by `STOCKLEDGER_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    ///
    /// Unset variables keep their defaults; set but unparsable ones are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut retry = RetryPolicy::default();

        if let Some(raw) = lookup(ENV_RETRY_MAX_ATTEMPTS) {
            retry.max_attempts = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_RETRY_MAX_ATTEMPTS}={raw:?} is not a count"))?;
        }
        if let Some(raw) = lookup(ENV_RETRY_BASE_DELAY_MS) {
            retry.base_delay = parse_millis(ENV_RETRY_BASE_DELAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RETRY_MAX_DELAY_MS) {
            retry.max_delay = parse_millis(ENV_RETRY_MAX_DELAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RETRY_STRATEGY) {
            retry.strategy = raw
                .parse::<BackoffStrategy>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("{ENV_RETRY_STRATEGY}={raw:?}"))?;
        }

        if retry.max_delay < retry.base_delay {
            anyhow::bail!(
                "{ENV_RETRY_MAX_DELAY_MS} ({:?}) is below {ENV_RETRY_BASE_DELAY_MS} ({:?})",
                retry.max_delay,
                retry.base_delay
            );
        }

        Ok(Self { retry })
    }
}

fn parse_millis(key: &str, raw: &str) -> anyhow::Result<Duration> {
    let ms: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key}={raw:?} is not a number of milliseconds"))?;
    Ok(Duration::from_millis(ms))
}
