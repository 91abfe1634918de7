use crate::crypto::{CryptoGateway, IDENTITY_LENGTH};
use crate::error::ValidationError;
use crate::utils::CancellationToken;
use crate::wallet::Wallet;
use log::{error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Check the prefix could ever match an uppercase identity
pub fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.is_empty()
        || prefix.len() > IDENTITY_LENGTH
        || !prefix.bytes().all(|b| b.is_ascii_uppercase())
    {
        return Err(ValidationError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// One worker per core, leaving one for the caller
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

/// Parallel search for a wallet whose identity starts with a prefix.
///
/// Workers stop when one of them finds a match, when `cancel()` is called
/// or when the caller's token is cancelled. The first match is kept.
pub struct BruteForceJob {
    prefix: String,
    stop: CancellationToken,
    attempts: Arc<AtomicU64>,
    result: Arc<Mutex<Option<Wallet>>>,
    workers: Vec<JoinHandle<()>>,
}

impl BruteForceJob {
    pub fn start(
        gateway: Arc<dyn CryptoGateway>,
        prefix: &str,
        workers: usize,
        cancel: CancellationToken,
    ) -> Result<BruteForceJob, ValidationError> {
        validate_prefix(prefix)?;

        let stop = CancellationToken::new();
        let attempts = Arc::new(AtomicU64::new(0));
        let result = Arc::new(Mutex::new(None));

        let handles = (0..workers.max(1))
            .map(|id| {
                let worker = Worker {
                    id,
                    gateway: Arc::clone(&gateway),
                    prefix: prefix.to_string(),
                    stop: stop.clone(),
                    cancel: cancel.clone(),
                    attempts: Arc::clone(&attempts),
                    result: Arc::clone(&result),
                };
                thread::spawn(move || worker.run())
            })
            .collect::<Vec<_>>();

        info!("Searching for prefix {prefix} with {} workers", handles.len());
        Ok(BruteForceJob {
            prefix: prefix.to_string(),
            stop,
            attempts,
            result,
            workers: handles,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn cancel(&self) {
        self.stop.cancel();
    }

    /// Wallets derived so far, across all workers
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.workers.iter().all(|handle| handle.is_finished())
    }

    /// Join every worker, then hand out the match if there was one
    pub fn wait(self) -> Option<Wallet> {
        for handle in self.workers {
            if handle.join().is_err() {
                warn!("A search worker for {} panicked", self.prefix);
            }
        }

        let found = self
            .result
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match &found {
            Some(wallet) => info!(
                "Found {} after {} attempts",
                wallet.identity(),
                self.attempts.load(Ordering::Relaxed)
            ),
            None => info!(
                "Search for {} stopped after {} attempts",
                self.prefix,
                self.attempts.load(Ordering::Relaxed)
            ),
        }
        found
    }
}

struct Worker {
    id: usize,
    gateway: Arc<dyn CryptoGateway>,
    prefix: String,
    stop: CancellationToken,
    cancel: CancellationToken,
    attempts: Arc<AtomicU64>,
    result: Arc<Mutex<Option<Wallet>>>,
}

impl Worker {
    fn run(self) {
        while !self.stop.is_cancelled() && !self.cancel.is_cancelled() {
            let wallet = match self
                .gateway
                .random_seed()
                .and_then(|seed| Ok(Wallet::from_seed(&*self.gateway, &seed)?))
            {
                Ok(wallet) => wallet,
                Err(e) => {
                    error!("Search worker {} giving up: {e}", self.id);
                    return;
                }
            };
            self.attempts.fetch_add(1, Ordering::Relaxed);

            if wallet.has_prefix(&self.prefix) {
                let mut slot = self.result.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.is_none() {
                    *slot = Some(wallet);
                }
                self.stop.cancel();
                return;
            }
        }
    }
}

/// Search on the default number of workers until a match or cancellation
pub fn search_prefix(
    gateway: Arc<dyn CryptoGateway>,
    prefix: &str,
    cancel: CancellationToken,
) -> Result<Option<Wallet>, ValidationError> {
    let job = BruteForceJob::start(gateway, prefix, default_workers(), cancel)?;
    Ok(job.wait())
}
