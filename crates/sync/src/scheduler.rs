//! Background refresh with visibility-aware pausing.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

/// Work run on every tick.
pub trait Refresh: Send + Sync + 'static {
    fn refresh(&self) -> impl Future<Output = ()> + Send;
}

impl<F, Fut> Refresh for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    fn refresh(&self) -> impl Future<Output = ()> + Send {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Runs a refresh on a fixed period while the dashboard is visible.
///
/// At most one timer task exists at a time. The timer awaits each refresh
/// before waiting for the next tick, so ticks never overlap each other.
/// Refreshes run in their own task: stopping the timer does not cancel a
/// request already in flight, so the immediate refresh on becoming visible
/// may run alongside one still pending from before. The state slots fence
/// responses by issue order, so the older one cannot overwrite the newer.
pub struct PollingScheduler<R: Refresh> {
    refresh: Arc<R>,
    period: Duration,
    timer: Option<JoinHandle<()>>,
}

impl<R: Refresh> PollingScheduler<R> {
    /// Starts ticking; the first refresh fires after one full period.
    pub fn start(period: Duration, refresh: R) -> Self {
        let mut scheduler = Self {
            refresh: Arc::new(refresh),
            period,
            timer: None,
        };
        scheduler.spawn_timer(false);
        scheduler
    }

    pub fn state(&self) -> SchedulerState {
        match &self.timer {
            Some(timer) if !timer.is_finished() => SchedulerState::Running,
            _ => SchedulerState::Stopped,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Reacts to the dashboard being hidden or shown.
    ///
    /// Hidden cancels the timer. Visible while stopped refreshes once right
    /// away and restarts the timer; visible while running is a no-op.
    pub fn set_visibility(&mut self, visibility: Visibility) {
        match (visibility, self.state()) {
            (Visibility::Hidden, SchedulerState::Running) => {
                tracing::debug!("dashboard hidden, pausing refresh");
                self.stop();
            }
            (Visibility::Visible, SchedulerState::Stopped) => {
                tracing::debug!("dashboard visible, resuming refresh");
                self.spawn_timer(true);
            }
            _ => {}
        }
    }

    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn spawn_timer(&mut self, immediate: bool) {
        self.stop();

        let refresh = Arc::clone(&self.refresh);
        let period = self.period;
        self.timer = Some(tokio::spawn(async move {
            if immediate {
                run_detached(&refresh).await;
            }
            let mut ticks = time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                run_detached(&refresh).await;
            }
        }));
    }
}

impl<R: Refresh> Drop for PollingScheduler<R> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_detached<R: Refresh>(refresh: &Arc<R>) {
    let refresh = Arc::clone(refresh);
    let handle = tokio::spawn(async move { refresh.refresh().await });
    if let Err(err) = handle.await {
        if err.is_panic() {
            tracing::error!("refresh task panicked: {err}");
        }
    }
}
