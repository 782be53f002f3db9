use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::daily::DailyJournal;
use crate::notify::{Subscription, UpdateNotifier};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Held for the duration of one check. Creating it announces `true` on the
/// checking channel; dropping it releases the flag and announces `false`,
/// whether the check finished, failed or panicked.
struct CheckGuard {
    flag: Arc<AtomicBool>,
    notifier: UpdateNotifier,
}

impl CheckGuard {
    fn acquire(flag: &Arc<AtomicBool>, notifier: &UpdateNotifier) -> Option<Self> {
        if flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return None;
        }
        notifier.publish_checking(true);
        Some(Self {
            flag: flag.clone(),
            notifier: notifier.clone(),
        })
    }
}

impl Drop for CheckGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.notifier.publish_checking(false);
    }
}

/// Drives [`DailyJournal::check_for_changes`] on a fixed interval.
pub struct Poller {
    journal: Arc<DailyJournal>,
    checking: Arc<AtomicBool>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    pub fn new(journal: Arc<DailyJournal>) -> Self {
        Self {
            journal,
            checking: Arc::new(AtomicBool::new(false)),
            timer: Mutex::new(None),
        }
    }

    pub fn subscribe_checking<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.journal.notifier().subscribe_checking(listener)
    }

    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::Acquire)
    }

    pub fn is_polling(&self) -> bool {
        let timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        timer.as_ref().map_or(false, |handle| !handle.is_finished())
    }

    /// Start (or restart) polling: one check right away, then one every
    /// `interval`. Firings that land while a check is still running are
    /// dropped, not queued.
    pub fn start_polling(&self, interval: Duration) {
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = timer.take() {
            previous.abort();
        }

        let journal = self.journal.clone();
        let flag = self.checking.clone();
        info!("⏰ Polling for journal updates every {}s", interval.as_secs_f64());

        *timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match CheckGuard::acquire(&flag, journal.notifier()) {
                    Some(guard) => {
                        let journal = journal.clone();
                        // the check outlives the timer if polling is stopped meanwhile
                        tokio::spawn(async move {
                            let _guard = guard;
                            journal.check_for_changes().await;
                        });
                    }
                    None => debug!("⏭️ Previous check still running, skipping this tick"),
                }
            }
        }));
    }

    pub fn stop_polling(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = timer.take() {
            handle.abort();
            info!("⏰ Polling stopped");
        }
    }

    /// Run one guarded check now. Returns `None` when another check holds the guard.
    pub async fn check_now(&self) -> Option<bool> {
        let _guard = CheckGuard::acquire(&self.checking, self.journal.notifier())?;
        Some(self.journal.check_for_changes().await)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
