use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
        mpsc::{self, RecvTimeoutError, Sender},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use super::{
    timer::{Timer, TimerCallback, TimerHandle},
    timer_error::TimerError,
};
use crate::{log::log_sink::LogSink, sink_trace, sink_warn};

struct Entry {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// One thread per scheduled entry. The thread waits on a stop channel with
/// the interval as timeout, so cancel wakes it immediately.
pub struct ThreadTimer {
    next_id: AtomicU64,
    entries: Mutex<HashMap<u64, Entry>>,
    logger: Arc<dyn LogSink>,
}

impl ThreadTimer {
    pub fn new(logger: Arc<dyn LogSink>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(HashMap::new()),
            logger,
        }
    }
}

impl Timer for ThreadTimer {
    fn schedule_periodic(
        &self,
        interval: Duration,
        cb: TimerCallback,
    ) -> Result<TimerHandle, TimerError> {
        if interval.is_zero() {
            return Err(TimerError::ZeroInterval);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let logger = self.logger.clone();
        let handle = thread::Builder::new()
            .name(format!("media-timer-{id}"))
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => cb(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                sink_trace!(logger, "[Timer] entry {id} stopped");
            })
            .map_err(|e| TimerError::Spawn(e.to_string()))?;

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Entry { stop_tx, handle });
        Ok(TimerHandle(id))
    }

    fn cancel(&self, handle: TimerHandle) {
        let entry = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle.0);
        let Some(entry) = entry else {
            return;
        };
        let _ = entry.stop_tx.send(());
        if entry.handle.thread().id() == thread::current().id() {
            return;
        }
        if entry.handle.join().is_err() {
            sink_warn!(self.logger, "[Timer] entry {} panicked", handle.0);
        }
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        let ids: Vec<u64> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        for id in ids {
            self.cancel(TimerHandle(id));
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::log::NoopLogSink;

    #[test]
    fn fires_until_cancelled() {
        let timer = ThreadTimer::new(Arc::new(NoopLogSink));
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let handle = timer
            .schedule_periodic(
                Duration::from_millis(5),
                Box::new(move || {
                    h.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        thread::sleep(Duration::from_millis(100));
        timer.cancel(handle);
        let after_cancel = hits.load(Ordering::SeqCst);
        assert!(after_cancel > 0);

        thread::sleep(Duration::from_millis(30));
        assert_eq!(hits.load(Ordering::SeqCst), after_cancel);
        // second cancel is a no-op
        timer.cancel(handle);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let timer = ThreadTimer::new(Arc::new(NoopLogSink));
        assert_eq!(
            timer.schedule_periodic(Duration::ZERO, Box::new(|| {})),
            Err(TimerError::ZeroInterval)
        );
    }
}
