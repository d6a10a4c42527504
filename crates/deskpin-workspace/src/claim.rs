//! The claim handshake that ties a host window to its native uuid.
//!
//! The daemon stamps a random marker into the window's title preface and asks
//! the native bridge which window's caption starts with it. The bridge answers
//! with the all-zero uuid while no single window matches (the title may not
//! have been repainted yet), in which case a fresh marker is tried.

use std::time::Duration;

use deskpin_common::{new_marker, ClaimError, HostWindowId, WindowUuid};
use deskpin_native::NativeClient;
use tracing::{debug, info, warn};

use crate::host::WindowHost;

/// Attempt budget for one window's claim.
#[derive(Debug, Clone, Copy)]
pub struct ClaimPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl From<&deskpin_config::WorkspaceConfig> for ClaimPolicy {
    fn from(config: &deskpin_config::WorkspaceConfig) -> Self {
        Self {
            max_attempts: config.claim_max_attempts,
            retry_delay: config.claim_retry_delay(),
        }
    }
}

/// Run the handshake for `window` until it yields a uuid, errors, or the
/// attempt budget runs out.
pub async fn claim_identity(
    host: &dyn WindowHost,
    native: &NativeClient,
    window: HostWindowId,
    policy: ClaimPolicy,
) -> Result<WindowUuid, ClaimError> {
    let attempts = policy.max_attempts.max(1);
    for attempt in 1..=attempts {
        let uuid = match stamp_and_claim(host, native, window).await {
            Ok(uuid) => uuid,
            Err(e) => {
                clear_preface(host, window).await;
                return Err(e);
            }
        };

        if !uuid.is_unclaimed() {
            clear_preface(host, window).await;
            info!(%window, %uuid, attempt, "window claimed");
            return Ok(uuid);
        }

        debug!(%window, attempt, "claim ambiguous, retrying with a fresh marker");
        if attempt < attempts && !policy.retry_delay.is_zero() {
            tokio::time::sleep(policy.retry_delay).await;
        }
    }

    clear_preface(host, window).await;
    Err(ClaimError::Exhausted { attempts })
}

async fn stamp_and_claim(
    host: &dyn WindowHost,
    native: &NativeClient,
    window: HostWindowId,
) -> Result<WindowUuid, ClaimError> {
    let marker = new_marker();
    host.set_title_preface(window, &marker).await?;
    Ok(native.claim_window(&marker).await?)
}

async fn clear_preface(host: &dyn WindowHost, window: HostWindowId) {
    if let Err(e) = host.set_title_preface(window, "").await {
        warn!(%window, error = %e, "failed to clear claim marker from title");
    }
}
