//! Retry policy with exponential backoff for reads.
//!
//! Transport failures, 429 and 5xx responses are retried with exponential
//! backoff up to `max_retries` times. Every other error is returned on the
//! first attempt. Mutations never go through this policy.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;

use crate::domain::errors::DomainResult;
use crate::domain::models::RetryConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub const fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Single attempt, no retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
        }
    }

    /// Run `operation`, retrying transient failures.
    pub async fn execute<T, F, Fut>(&self, label: &str, operation: F) -> DomainResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_max_interval(self.max_backoff)
            .with_max_elapsed_time(None)
            .build();

        let attempts = AtomicU32::new(0);
        let attempts = &attempts;
        let operation = &operation;
        let max_retries = self.max_retries;

        backoff::future::retry(backoff, move || async move {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            operation().await.map_err(|err| {
                if err.is_transient() && attempt < max_retries {
                    tracing::warn!(
                        query = label,
                        attempt = attempt + 1,
                        max_retries,
                        error = %err,
                        "transient fetch error, retrying"
                    );
                    backoff::Error::transient(err)
                } else {
                    backoff::Error::permanent(err)
                }
            })
        })
        .await
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
