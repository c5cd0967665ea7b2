use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::feed::{FetchError, FetchRequest, FetchTrigger};

/// Recurring wake-up that asks for background fetches while the reader is
/// not in front.
pub trait WakeScheduler {
    /// Arm the wake-up. Arming an armed scheduler keeps the existing schedule.
    fn start(&mut self);
    /// Disarm. No-op when nothing is armed.
    fn stop(&mut self);
    fn is_armed(&self) -> bool;
}

/// Wake-up backed by a tokio interval task. The first request fires one
/// full period after arming. The schedule ends with the process.
pub struct IntervalAlarm<T> {
    period: Duration,
    trigger: T,
    task: Option<JoinHandle<()>>,
}

impl<T> IntervalAlarm<T>
where
    T: FetchTrigger + Clone + Send + 'static,
{
    pub fn new(period: Duration, trigger: T) -> Self {
        Self {
            period,
            trigger,
            task: None,
        }
    }
}

impl<T> WakeScheduler for IntervalAlarm<T>
where
    T: FetchTrigger + Clone + Send + 'static,
{
    fn start(&mut self) {
        if self.is_armed() {
            return;
        }

        let trigger = self.trigger.clone();
        let period = self.period;
        let first = Instant::now() + period;
        tracing::info!(period_secs = period.as_secs(), "Background refresh armed");

        self.task = Some(tokio::spawn(async move {
            let mut ticks = interval_at(first, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                match trigger.request(FetchRequest::background()) {
                    Ok(()) => tracing::debug!("Background refresh requested"),
                    Err(FetchError::ServiceUnavailable) => {
                        tracing::debug!("Fetch service gone, background refresh ends");
                        break;
                    }
                    Err(e) => tracing::warn!(error = %e, "Background refresh request failed"),
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!("Background refresh disarmed");
        }
    }

    fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl<T> Drop for IntervalAlarm<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingTrigger {
        background: Arc<AtomicUsize>,
    }

    impl FetchTrigger for CountingTrigger {
        fn request(&self, request: FetchRequest) -> Result<(), FetchError> {
            if request.background {
                self.background.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    async fn advance(by: Duration) {
        tokio::time::advance(by).await;
        // Let the alarm task observe the tick.
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_period_after_arming() {
        let trigger = CountingTrigger::default();
        let mut alarm = IntervalAlarm::new(Duration::from_secs(60), trigger.clone());

        alarm.start();
        assert!(alarm.is_armed());
        tokio::task::yield_now().await;
        assert_eq!(trigger.background.load(Ordering::SeqCst), 0);

        advance(Duration::from_secs(60)).await;
        assert_eq!(trigger.background.load(Ordering::SeqCst), 1);

        advance(Duration::from_secs(60)).await;
        assert_eq!(trigger.background.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_disarms() {
        let trigger = CountingTrigger::default();
        let mut alarm = IntervalAlarm::new(Duration::from_secs(60), trigger.clone());

        alarm.start();
        alarm.stop();
        assert!(!alarm.is_armed());

        advance(Duration::from_secs(120)).await;
        assert_eq!(trigger.background.load(Ordering::SeqCst), 0);

        // Stopping twice is harmless.
        alarm.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_keeps_one_schedule() {
        let trigger = CountingTrigger::default();
        let mut alarm = IntervalAlarm::new(Duration::from_secs(60), trigger.clone());

        alarm.start();
        alarm.start();
        advance(Duration::from_secs(60)).await;
        assert_eq!(trigger.background.load(Ordering::SeqCst), 1);
    }
}
