// Confirmation of broadcast transactions.
// I keep every receipt here and poll the node: once the current tick has moved
// past a receipt's scheduled tick, that tick's data decides Success or Failed.

use crate::core::receipt::{Receipt, Status};
use crate::error::ConnectionError;
use crate::network::messages::TickData;
use crate::network::ConnectionPtr;
use crate::query::{contains_transaction, get_tick, get_tick_data};
use crate::utils::CancellationToken;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, LockResult, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default spacing between two polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

// Longest the background poller sleeps before rechecking its token
const POLLER_NAP: Duration = Duration::from_millis(50);

/// What a call to [`ConfirmationTracker::poll`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The interval since the last poll has not elapsed yet
    Skipped,
    /// No receipt is waiting for confirmation
    Idle,
    /// The current tick could not be fetched; nothing changed
    Retry(ConnectionError),
    /// Receipts were checked against the current tick
    Checked {
        current_tick: u32,
        resolved: usize,
        still_pending: usize,
    },
}

#[derive(Default)]
struct History {
    receipts: Vec<Receipt>,
    last_poll: Option<Instant>,
}

/// Owns the receipt history and drives receipts to a terminal status.
///
/// Each poll issues a single current-tick query shared by every pending
/// receipt and fetches each elapsed tick's data at most once.
pub struct ConfirmationTracker {
    connection: ConnectionPtr,
    poll_interval: Duration,
    history: Mutex<History>,
    polling: Mutex<()>,
}

// Lock even if a previous holder panicked
fn recover<'a, T>(result: LockResult<MutexGuard<'a, T>>) -> MutexGuard<'a, T> {
    result.unwrap_or_else(PoisonError::into_inner)
}

impl ConfirmationTracker {
    pub fn new(connection: ConnectionPtr, poll_interval: Duration) -> ConfirmationTracker {
        ConfirmationTracker {
            connection,
            poll_interval,
            history: Mutex::new(History::default()),
            polling: Mutex::new(()),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn track(&self, receipt: Receipt) {
        debug!("Tracking {} for tick {}", receipt.hash(), receipt.tick());
        recover(self.history.lock()).receipts.push(receipt);
    }

    /// Snapshot of every receipt, oldest first
    pub fn receipts(&self) -> Vec<Receipt> {
        recover(self.history.lock()).receipts.clone()
    }

    pub fn pending(&self) -> Vec<Receipt> {
        recover(self.history.lock())
            .receipts
            .iter()
            .filter(|r| r.is_pending())
            .cloned()
            .collect()
    }

    pub fn status_of(&self, hash: &str) -> Option<Status> {
        recover(self.history.lock())
            .receipts
            .iter()
            .find(|r| r.hash() == hash)
            .map(|r| r.status())
    }

    /// Poll unless the last poll was less than one interval ago
    pub fn poll(&self) -> PollOutcome {
        let _polling = recover(self.polling.lock());
        {
            let mut history = recover(self.history.lock());
            if let Some(last) = history.last_poll {
                if last.elapsed() < self.poll_interval {
                    return PollOutcome::Skipped;
                }
            }
            history.last_poll = Some(Instant::now());
        }
        self.check_pending()
    }

    /// Poll immediately, ignoring the interval
    pub fn poll_now(&self) -> PollOutcome {
        let _polling = recover(self.polling.lock());
        recover(self.history.lock()).last_poll = Some(Instant::now());
        self.check_pending()
    }

    fn check_pending(&self) -> PollOutcome {
        let pending_ticks: Vec<u32> = recover(self.history.lock())
            .receipts
            .iter()
            .filter(|r| r.is_pending())
            .map(|r| r.tick())
            .collect();
        if pending_ticks.is_empty() {
            return PollOutcome::Idle;
        }

        let current_tick = match get_tick(&self.connection) {
            Ok(tick) => tick,
            Err(e) => {
                warn!("Failed to fetch current tick, retrying next poll: {e}");
                return PollOutcome::Retry(e);
            }
        };

        // A receipt's tick must be over before its data is final
        let mut tick_data: HashMap<u32, Option<Box<TickData>>> = HashMap::new();
        for tick in pending_ticks.into_iter().filter(|&tick| tick < current_tick) {
            tick_data.entry(tick).or_insert_with(|| {
                match get_tick_data(&self.connection, tick) {
                    Ok(data) => Some(data),
                    Err(e) => {
                        warn!("Failed to fetch data of tick {tick}, retrying next poll: {e}");
                        None
                    }
                }
            });
        }

        let mut resolved = 0;
        let mut still_pending = 0;
        let mut history = recover(self.history.lock());
        for receipt in history.receipts.iter_mut().filter(|r| r.is_pending()) {
            let Some(Some(data)) = tick_data.get(&receipt.tick()) else {
                still_pending += 1;
                continue;
            };
            let status = if contains_transaction(data, receipt.digest()) {
                Status::Success
            } else {
                Status::Failed
            };
            if receipt.resolve(status) {
                info!("Transaction {} {status} at tick {}", receipt.hash(), receipt.tick());
                resolved += 1;
            }
        }

        PollOutcome::Checked {
            current_tick,
            resolved,
            still_pending,
        }
    }

    /// Poll on a background thread until `cancel` is triggered
    pub fn spawn_poller(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let tracker = Arc::clone(self);
        thread::spawn(move || {
            while !cancel.is_cancelled() {
                if let PollOutcome::Checked { resolved, .. } = tracker.poll() {
                    if resolved > 0 {
                        debug!("Poller resolved {resolved} receipts");
                    }
                }
                thread::sleep(tracker.poll_interval.min(POLLER_NAP));
            }
            debug!("Confirmation poller stopped");
        })
    }
}
