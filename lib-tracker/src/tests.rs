use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use steps::{Calories, SensorSample, DEBOUNCE_MS};
use tokio::{
    sync::{mpsc, watch},
    time::{sleep, Instant},
};

use crate::*;

/// Forwards every render so a test can await them one at a time.
///
struct RecordingSink
{
    renders: mpsc::UnboundedSender<Readout>,
}

impl RecordingSink {
    fn new() -> (Self, mpsc::UnboundedReceiver<Readout>) {
        let (renders, receiver) = mpsc::unbounded_channel();
        (RecordingSink { renders }, receiver)
    }
}

impl Presentation for RecordingSink {
    fn render(&mut self, readout: &Readout) {
        let _ = self.renders.send(*readout);
    }
}

fn sample(timestamp_ms: u64, value: f32) -> SensorSample {
    SensorSample::new(value, timestamp_ms)
}

fn readout(steps: u32, active: bool) -> Readout {
    Readout { steps, active, calories: Calories::from_steps(steps) }
}

/// The timer wheel works in whole milliseconds, so allow deadlines to land a tick or two late.
///
fn assert_elapsed(start: Instant, expected_ms: u64) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_millis(expected_ms) && elapsed <= Duration::from_millis(expected_ms + 2),
        "expected ~{}ms, got {:?}", expected_ms, elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn walking_scenario_with_window_timer() {
    let start = Instant::now();
    let (feed, source) = ChannelSource::new(FEED_CAPACITY);
    let (sink, mut renders) = RecordingSink::new();
    let handle = Tracker::start(source, sink);

    assert_eq!(renders.recv().await, Some(Readout::idle()));

    feed.send(sample(0, 0.0)).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    feed.send(sample(100, 0.5)).await.unwrap();
    assert_eq!(renders.recv().await, Some(readout(1, true)));

    sleep(Duration::from_millis(400)).await;
    feed.send(sample(500, 0.9)).await.unwrap();

    // Next thing rendered is the timer closing the window, the t=500 sample changed nothing.
    assert_eq!(renders.recv().await, Some(readout(1, false)));
    assert_elapsed(start, 100 + DEBOUNCE_MS);

    feed.send(sample(1301, 1.4)).await.unwrap();
    let active = renders.recv().await.unwrap();
    assert_eq!(active, readout(2, true));
    assert_eq!(active.pose(), Pose::Running);

    let summary = handle.stop().await.unwrap();
    assert_eq!(summary, SessionSummary {
        sensor_available: true,
        steps: 2,
        steps_total: 2,
        samples_seen: 4,
        samples_discarded: 0,
        resets: 0,
    });
    assert!(feed.is_released());
}

#[tokio::test(start_paused = true)]
async fn reset_does_not_cancel_pending_window() {
    let (feed, source) = ChannelSource::new(8);
    let (sink, mut renders) = RecordingSink::new();
    let handle = Tracker::start(source, sink);
    assert_eq!(renders.recv().await, Some(Readout::idle()));

    let start = Instant::now();
    feed.send(sample(0, 0.5)).await.unwrap();
    assert_eq!(renders.recv().await, Some(readout(1, true)));

    handle.reset().unwrap();
    assert_eq!(renders.recv().await, Some(readout(0, true)));
    assert_eq!(renders.recv().await, Some(readout(0, false)));
    assert_elapsed(start, DEBOUNCE_MS);

    // Detection state survived the reset: still measured against 0.5 at t=0.
    feed.send(sample(5000, 0.55)).await.unwrap();
    feed.send(sample(5000, 1.5)).await.unwrap();
    assert_eq!(renders.recv().await, Some(readout(1, true)));

    let summary = handle.stop().await.unwrap();
    assert_eq!(summary.steps, 1);
    assert_eq!(summary.steps_total, 2);
    assert_eq!(summary.resets, 1);
    assert_eq!(summary.samples_seen, 3);
}

#[tokio::test(start_paused = true)]
async fn non_finite_samples_are_discarded() {
    let (feed, source) = ChannelSource::new(8);
    let (sink, mut renders) = RecordingSink::new();
    let handle = Tracker::start(source, sink);
    assert_eq!(renders.recv().await, Some(Readout::idle()));

    feed.send(sample(0, f32::NAN)).await.unwrap();
    feed.send(sample(5, f32::INFINITY)).await.unwrap();
    feed.send(sample(10, 0.5)).await.unwrap();
    assert_eq!(renders.recv().await, Some(readout(1, true)));

    let summary = handle.stop().await.unwrap();
    assert_eq!(summary.samples_seen, 3);
    assert_eq!(summary.samples_discarded, 2);
    assert_eq!(summary.steps, 1);
}

#[tokio::test(start_paused = true)]
async fn unavailable_sensor_stays_idle() {
    let (feed, source) = ChannelSource::unavailable();
    let (sink, mut renders) = RecordingSink::new();
    let handle = Tracker::start(source, sink);

    let first = renders.recv().await.unwrap();
    assert_eq!(first, Readout::idle());
    assert_eq!(first.pose(), Pose::Sitting);
    assert!(feed.is_released());
    assert!(!feed.push(sample(0, 1.0)));

    sleep(Duration::from_secs(10)).await;
    assert!(!handle.is_finished());

    handle.reset().unwrap();
    let summary = handle.stop().await.unwrap();
    assert!(!summary.sensor_available);
    assert_eq!(summary.steps, 0);
    assert_eq!(summary.resets, 1);

    // Resetting a zero count changes nothing on screen.
    assert_eq!(renders.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_releases_listener() {
    let (feed, source) = ChannelSource::new(8);
    let (readouts, _) = watch::channel(Readout::idle());
    let handle = Tracker::start(source, readouts);

    feed.send(sample(0, 0.5)).await.unwrap();
    assert!(!feed.is_released());

    drop(handle);
    feed.released().await;
    assert!(feed.is_released());
}

#[tokio::test(start_paused = true)]
async fn feed_ending_finishes_tracking() {
    let (feed, source) = ChannelSource::new(8);
    let (readouts, latest) = watch::channel(Readout::idle());
    let handle = Tracker::start(source, readouts);

    feed.send(sample(0, 0.5)).await.unwrap();
    feed.send(sample(100, 2.0)).await.unwrap();
    drop(feed);

    let summary = handle.join().await.unwrap();
    assert_eq!(summary.steps, 1);
    assert_eq!(summary.samples_seen, 2);

    // Tracking ended while the window was still open, the pending close was discarded.
    assert_eq!(*latest.borrow(), readout(1, true));
}

#[tokio::test(start_paused = true)]
async fn reset_after_tracking_ended_fails() {
    let (feed, source) = ChannelSource::new(8);
    let (sink, _renders) = RecordingSink::new();
    let handle = Tracker::start(source, sink);

    drop(feed);
    while !handle.is_finished() {
        sleep(Duration::from_millis(1)).await;
    }
    assert!(matches!(handle.reset(), Err(TrackerError::Stopped)));

    // Stopping a finished tracker still reports how it went.
    let summary = handle.stop().await.unwrap();
    assert!(summary.sensor_available);
    assert_eq!(summary.samples_seen, 0);
}

#[tokio::test(start_paused = true)]
async fn replay_keeps_recorded_spacing() {
    let recording = vec![
        sample(0, 0.0),
        sample(100, 0.5),
        sample(500, 0.9),
        sample(1400, 1.4),
    ];
    let (sink, mut renders) = RecordingSink::new();
    let start = Instant::now();
    let handle = Tracker::start(ReplaySource::new(recording), sink);

    let summary = handle.join().await.unwrap();
    assert_elapsed(start, 1400);
    assert_eq!(summary.steps, 2);
    assert_eq!(summary.samples_seen, 4);

    let mut seen = Vec::new();
    while let Some(readout) = renders.recv().await {
        seen.push(readout);
    }
    assert_eq!(seen, vec![
        Readout::idle(),
        readout(1, true),
        readout(1, false),
        readout(2, true),
    ]);
}

/// Reports a sensor but refuses to attach a listener, like a denied motion permission.
///
struct RefusingSource;

impl SampleSource for RefusingSource {
    fn is_available(&self) -> bool {
        true
    }

    fn subscribe(&mut self) -> Result<Subscription, TrackerError> {
        Err(TrackerError::Subscribe("permission denied".into()))
    }
}

#[tokio::test(start_paused = true)]
async fn refused_subscription_stays_idle() {
    let (sink, mut renders) = RecordingSink::new();
    let handle = Tracker::start(RefusingSource, sink);
    assert_eq!(renders.recv().await, Some(Readout::idle()));

    sleep(Duration::from_secs(1)).await;
    assert!(!handle.is_finished());
    handle.reset().unwrap();

    let summary = handle.stop().await.unwrap();
    assert!(!summary.sensor_available);
    assert_eq!(summary.steps, 0);
    assert_eq!(summary.samples_seen, 0);
    assert_eq!(summary.resets, 1);
}

#[tokio::test(start_paused = true)]
async fn stopping_replay_cuts_recording_short() {
    let recording = vec![
        sample(0, 0.5),
        sample(1_000, 2.0),
        sample(3_600_000, 4.0),
    ];
    let length = recording.len() as u64;
    let (sink, mut renders) = RecordingSink::new();
    let start = Instant::now();
    let handle = Tracker::start(ReplaySource::new(recording), sink);

    assert_eq!(renders.recv().await, Some(Readout::idle()));
    assert_eq!(renders.recv().await, Some(readout(1, true)));

    let summary = handle.stop().await.unwrap();
    assert!(summary.samples_seen < length);
    assert!(start.elapsed() < Duration::from_secs(60), "waited {:?}", start.elapsed());
}

#[test]
fn channel_source_hands_out_one_listener() {
    let (feed, mut source) = ChannelSource::new(4);
    assert!(source.is_available());

    let subscription = source.subscribe().unwrap();
    assert!(matches!(source.subscribe(), Err(TrackerError::AlreadySubscribed)));
    assert!(!feed.is_released());

    drop(subscription);
    assert!(feed.is_released());
    assert!(!feed.push(sample(0, 1.0)));
}

#[test]
fn unavailable_source_refuses_subscription() {
    let (_feed, mut source) = ChannelSource::unavailable();
    assert!(!source.is_available());
    assert!(matches!(source.subscribe(), Err(TrackerError::Subscribe(_))));
}

#[test]
fn subscription_releases_exactly_once() {
    let released = Arc::new(AtomicUsize::new(0));
    let counter = released.clone();
    let (_sender, receiver) = mpsc::channel(1);

    let subscription = Subscription::with_release(receiver, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(released.load(Ordering::SeqCst), 0);

    drop(subscription);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn full_feed_drops_samples_but_stays_live() {
    let (feed, _source) = ChannelSource::new(1);
    assert!(feed.push(sample(0, 1.0)));
    assert!(feed.push(sample(10, 2.0)));
    assert!(!feed.is_released());
}

#[test]
fn watch_presentation_keeps_latest_readout() {
    let (mut readouts, latest) = watch::channel(Readout::idle());
    readouts.render(&readout(20, true));
    assert_eq!(*latest.borrow(), readout(20, true));
    assert_eq!(latest.borrow().calories.to_string(), "1.00");
}

#[test]
fn error_messages() {
    assert_eq!(TrackerError::Stopped.to_string(), "Tracking has stopped");
    assert_eq!(
        TrackerError::Subscribe("no sensor".into()).to_string(),
        "Could not subscribe to sensor: no sensor"
    );
}
