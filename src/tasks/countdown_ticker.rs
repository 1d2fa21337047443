//! One-second ticker driving a single countdown run

use std::{sync::Weak, time::Duration};
use tokio::time::{interval_at, Instant};
use tracing::debug;

use crate::state::{AppState, Generation};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Tick the countdown run `generation` once per second until it stops being live.
///
/// The first tick lands one interval after the run starts, the start itself
/// having already published the full duration.
pub async fn countdown_ticker_task(state: Weak<AppState>, generation: Generation) {
    debug!("Ticker started for countdown generation {}", generation);

    let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);

    loop {
        interval.tick().await;

        let Some(live) = state.upgrade() else {
            break;
        };
        if !live.countdown_tick(generation) {
            break;
        }
    }

    debug!("Ticker stopped for countdown generation {}", generation);
}
