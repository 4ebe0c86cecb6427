use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use fti_sync::scheduler::{PollingScheduler, SchedulerState, Visibility};

const PERIOD: Duration = Duration::from_secs(30);

fn counter() -> (Arc<AtomicUsize>, impl Fn() -> std::future::Ready<()> + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&count);
    let refresh = move || {
        inner.fetch_add(1, Ordering::SeqCst);
        std::future::ready(())
    };
    (count, refresh)
}

/// Lets spawned tasks run without moving the paused clock past a tick.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn first_refresh_waits_one_period() {
    let (count, refresh) = counter();
    let scheduler = PollingScheduler::start(PERIOD, refresh);
    assert_eq!(scheduler.state(), SchedulerState::Running);

    settle().await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    tokio::time::sleep(PERIOD).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    tokio::time::sleep(PERIOD).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn hidden_then_visible_refreshes_exactly_once() {
    let (count, refresh) = counter();
    let mut scheduler = PollingScheduler::start(PERIOD, refresh);

    tokio::time::sleep(Duration::from_secs(10)).await;
    scheduler.set_visibility(Visibility::Hidden);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);

    tokio::time::sleep(Duration::from_secs(5)).await;
    scheduler.set_visibility(Visibility::Visible);
    settle().await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.state(), SchedulerState::Running);

    // The restarted timer counts a full period from the visible signal.
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn hidden_scheduler_does_not_tick() {
    let (count, refresh) = counter();
    let mut scheduler = PollingScheduler::start(PERIOD, refresh);
    scheduler.set_visibility(Visibility::Hidden);

    tokio::time::sleep(PERIOD * 4).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn visible_while_running_is_ignored() {
    let (count, refresh) = counter();
    let mut scheduler = PollingScheduler::start(PERIOD, refresh);

    scheduler.set_visibility(Visibility::Visible);
    scheduler.set_visibility(Visibility::Visible);
    settle().await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    tokio::time::sleep(PERIOD).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_refresh_never_overlaps_itself() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let (r, p) = (Arc::clone(&running), Arc::clone(&peak));
    let refresh = move || {
        let (running, peak) = (Arc::clone(&r), Arc::clone(&p));
        async move {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(PERIOD * 3).await;
            running.fetch_sub(1, Ordering::SeqCst);
        }
    };
    let _scheduler = PollingScheduler::start(PERIOD, refresh);

    tokio::time::sleep(PERIOD * 10).await;
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}
