//! Provisioning poller
//!
//! Some resources are accepted by the remote API before they are usable. After such a create,
//! [`wait_until_terminal`] re-reads the resource until it reports a terminal state or the
//! overall timeout expires.

use crate::error::ReconcileError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info};

/// Provisioning status of an asynchronously created resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisioningState {
    Pending,
    Ready,
    Failed,
    /// The resource could not be found at all.
    NotFound,
}

impl ProvisioningState {
    /// `Ready` and `Failed` end the wait. `NotFound` is handled separately as an error.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Ready => "READY",
            Self::Failed => "FAILED",
            Self::NotFound => "NOT_FOUND",
        }
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProvisioningState {
    type Err = String;

    /// Parses the remote API's state strings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "READY" => Ok(Self::Ready),
            "FAILED" => Ok(Self::Failed),
            "NOT_FOUND" => Ok(Self::NotFound),
            other => Err(other.to_string()),
        }
    }
}

/// Timing for [`wait_until_terminal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Sleep before the first read.
    pub initial_delay: Duration,
    /// Sleep between reads while still pending.
    pub min_interval: Duration,
    /// Bound on the whole wait, initial delay included.
    pub timeout: Duration,
}

/// Default delay before the first provisioning check.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Default interval between provisioning checks.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Default bound on a provisioning wait (20 minutes).
pub const DEFAULT_PROVISIONING_TIMEOUT: Duration = Duration::from_secs(20 * 60);

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            min_interval: DEFAULT_MIN_INTERVAL,
            timeout: DEFAULT_PROVISIONING_TIMEOUT,
        }
    }
}

/// Poll `read` until it reports `Ready` or `Failed`.
///
/// * `Ready`/`Failed` - returned as `Ok`; the caller decides what a failed provisioning means.
/// * `Pending` - sleep `min_interval` and read again. The interval is constant.
/// * `NotFound` - fails immediately with [`ReconcileError::PollNotFound`]. This may be
///   read-after-write lag on the remote side but is not retried.
/// * a read error - aborts the wait and is returned unchanged.
///
/// Expiry of `settings.timeout` yields [`ReconcileError::PollTimeout`]. Nothing is rolled back
/// in any failure case; `id` is carried in the error so the caller can still record it.
pub async fn wait_until_terminal<F, Fut>(
    id: &str,
    settings: &PollSettings,
    mut read: F,
) -> Result<ProvisioningState, ReconcileError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ProvisioningState, ReconcileError>>,
{
    let started = Instant::now();

    let poll = async {
        sleep(settings.initial_delay).await;
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match read().await? {
                ProvisioningState::Pending => {
                    debug!(%id, attempts, "Still provisioning");
                    sleep(settings.min_interval).await;
                }
                ProvisioningState::NotFound => {
                    return Err(ReconcileError::PollNotFound { id: id.to_string() });
                }
                terminal => {
                    info!(%id, attempts, state = %terminal, "Provisioning finished");
                    return Ok(terminal);
                }
            }
        }
    };

    match timeout(settings.timeout, poll).await {
        Ok(result) => result,
        Err(_) => Err(ReconcileError::PollTimeout {
            id: id.to_string(),
            waited: started.elapsed(),
        }),
    }
}
