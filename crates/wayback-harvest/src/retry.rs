// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Navigation retry controller.
//!
//! Loads one replay URL with a bounded number of attempts and a fixed delay
//! between them. Exhausting the attempts is not an error for the run; the
//! caller skips the snapshot.

use crate::events::{EventBus, HarvestEvent};
use crate::renderer::RenderContext;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Suspends the current task. Swapped out in tests to avoid wall-clock waits.
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Attempt budget for one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub timeout: Duration,
}

/// How a load ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { attempts: u32 },
    Exhausted { attempts: u32, last_error: String },
}

impl LoadOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Loaded { attempts } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}

enum Attempt {
    Navigate(u32),
    Backoff { next: u32 },
    Done(LoadOutcome),
}

/// Navigate `ctx` to `url`, retrying on failure.
///
/// Each attempt is bounded by `policy.timeout`. No delay follows the final
/// failed attempt.
pub async fn load(
    ctx: &mut dyn RenderContext,
    url: &str,
    policy: &RetryPolicy,
    pause: &dyn Pause,
    events: &EventBus,
) -> LoadOutcome {
    let max_attempts = policy.max_attempts.max(1);
    let mut state = Attempt::Navigate(1);

    loop {
        state = match state {
            Attempt::Navigate(attempt) => match ctx.navigate(url, policy.timeout).await {
                Ok(nav) => {
                    debug!(url, attempt, load_time_ms = nav.load_time_ms, "snapshot loaded");
                    Attempt::Done(LoadOutcome::Loaded { attempts: attempt })
                }
                Err(e) => {
                    let error = format!("{e:#}");
                    warn!(url, attempt, max_attempts, %error, "navigation failed");
                    events.emit(HarvestEvent::NavigationFailed {
                        replay_url: url.to_string(),
                        attempt,
                        max_attempts,
                        error: error.clone(),
                    });
                    if attempt >= max_attempts {
                        Attempt::Done(LoadOutcome::Exhausted {
                            attempts: attempt,
                            last_error: error,
                        })
                    } else {
                        Attempt::Backoff { next: attempt + 1 }
                    }
                }
            },
            Attempt::Backoff { next } => {
                pause.pause(policy.delay).await;
                Attempt::Navigate(next)
            }
            Attempt::Done(outcome) => return outcome,
        };
    }
}
