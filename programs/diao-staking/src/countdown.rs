// =============================================================================
// Lock Window Countdown
// =============================================================================
// unlock_time = stake_timestamp + lock_duration
// time_left   = max(0, unlock_time - now)
//
// time_left only exists while something is staked and the contract reported a
// nonzero stake timestamp.
// =============================================================================

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::state::{Balances, ViewState};

/// Source of the current unix time in seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Seconds until `stake_timestamp + lock_duration`, floored at zero
pub fn time_left(stake_timestamp: u64, now: u64, lock_duration: u64) -> u64 {
    stake_timestamp
        .saturating_add(lock_duration)
        .saturating_sub(now)
}

/// Remaining lock for a set of balances.
///
/// `None` when nothing is staked or the timestamp is missing/zero, whatever a
/// stale timestamp might say.
pub fn remaining_lock(balances: &Balances, now: u64, lock_duration: u64) -> Option<u64> {
    if balances.staked_amount == 0 {
        return None;
    }
    match balances.stake_timestamp {
        Some(ts) if ts > 0 => Some(time_left(ts, now, lock_duration)),
        _ => None,
    }
}

/// "20일 0시간 0분"; empty for zero
pub fn format_time(seconds: u64) -> String {
    if seconds == 0 {
        return String::new();
    }
    const DAY: u64 = 24 * 60 * 60;
    const HOUR: u64 = 60 * 60;
    let days = seconds / DAY;
    let hours = (seconds % DAY) / HOUR;
    let minutes = (seconds % HOUR) / 60;
    format!("{days}일 {hours}시간 {minutes}분")
}

/// Spawn the per-second countdown.
///
/// Each tick recomputes `time_left` into the view. The task ends on the first
/// tick that yields zero, or when the stake disappears from the view.
pub fn spawn_countdown(
    view: Arc<RwLock<ViewState>>,
    clock: Arc<dyn Clock>,
    lock_duration: u64,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let remaining = view.write().tick_countdown(clock.now(), lock_duration);
            match remaining {
                Some(0) => {
                    debug!("Lock window elapsed, countdown stopped");
                    break;
                }
                Some(_) => {}
                None => {
                    debug!("No active stake, countdown stopped");
                    break;
                }
            }
        }
    })
}
