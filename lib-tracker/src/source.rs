use std::time::Duration;

use steps::SensorSample;
use tokio::{sync::mpsc, time::Instant};

use crate::TrackerError;

/// Samples buffered between the platform callback and the tracking task. At typical sensor rates
/// this is a few seconds worth of readings.
///
pub const FEED_CAPACITY: usize = 128;

/// Capability to deliver accelerometer samples, e.g. the platform motion sensor.
///
pub trait SampleSource
{
    /// Is there a sensor to subscribe to at all? Checked once before subscribing.
    fn is_available(&self) -> bool;

    /// Attaches a listener to the sensor. The listener stays attached for as long as the returned
    /// subscription lives.
    fn subscribe(&mut self) -> Result<Subscription, TrackerError>;
}

/// A live sensor listener. Dropping it detaches the listener, however tracking ended.
///
pub struct Subscription
{
    samples: mpsc::Receiver<SensorSample>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {

    pub fn new(samples: mpsc::Receiver<SensorSample>) -> Self {
        Subscription { samples, release: None }
    }

    /// Like `new`, but `release` runs exactly once when the subscription is dropped.
    ///
    pub fn with_release(
        samples: mpsc::Receiver<SensorSample>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Subscription { samples, release: Some(Box::new(release)) }
    }

    /// Waits for the next sample, `None` once the sensor stopped delivering.
    ///
    pub async fn recv(&mut self) -> Option<SensorSample> {
        self.samples.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.samples.close();
        if let Some(release) = self.release.take() {
            release();
        }
        log::debug!("Sensor listener released");
    }
}

/// Platform side of a `ChannelSource`: the sensor callback pushes readings through this.
///
#[derive(Debug, Clone)]
pub struct SampleFeed
{
    sender: mpsc::Sender<SensorSample>,
}

impl SampleFeed {

    /// Delivers a sample, waiting for room in the buffer. Fails once the listener was released.
    ///
    pub async fn send(&self, sample: SensorSample) -> Result<(), TrackerError> {
        self.sender.send(sample).await.map_err(|_| TrackerError::Stopped)
    }

    /// Non-blocking delivery for use from sensor callbacks. A full buffer drops the sample since
    /// the sensor keeps producing new ones anyway. Returns `false` once the listener is released.
    ///
    pub fn push(&self, sample: SensorSample) -> bool {
        match self.sender.try_send(sample) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("Sample buffer full, dropping sample at {} ms", sample.timestamp_ms);
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves once nobody listens to this feed anymore.
    ///
    pub async fn released(&self) {
        self.sender.closed().await
    }
}

/// Sample source backed by a channel that the platform glue (or a test) feeds by hand.
///
#[derive(Debug)]
pub struct ChannelSource
{
    available: bool,
    receiver: Option<mpsc::Receiver<SensorSample>>,
}

impl ChannelSource {

    pub fn new(capacity: usize) -> (SampleFeed, ChannelSource) {
        let (sender, receiver) = mpsc::channel(capacity);
        let source = ChannelSource { available: true, receiver: Some(receiver) };
        (SampleFeed { sender }, source)
    }

    /// A device without an accelerometer. The returned feed is released from the start.
    ///
    pub fn unavailable() -> (SampleFeed, ChannelSource) {
        let (sender, _) = mpsc::channel(1);
        let source = ChannelSource { available: false, receiver: None };
        (SampleFeed { sender }, source)
    }
}

impl SampleSource for ChannelSource {
    fn is_available(&self) -> bool {
        self.available
    }

    fn subscribe(&mut self) -> Result<Subscription, TrackerError> {
        if !self.available {
            return Err(TrackerError::Subscribe("accelerometer not available".into()));
        }
        let receiver = self.receiver.take().ok_or(TrackerError::AlreadySubscribed)?;
        Ok(Subscription::new(receiver))
    }
}

/// Plays back a recording with the same spacing between samples as when it was captured.
///
/// Subscribing spawns the feeder task, so it has to happen inside a tokio runtime.
///
#[derive(Debug)]
pub struct ReplaySource
{
    samples: Option<Vec<SensorSample>>,
}

impl ReplaySource {

    pub fn new(samples: Vec<SensorSample>) -> Self {
        ReplaySource { samples: Some(samples) }
    }
}

impl SampleSource for ReplaySource {
    fn is_available(&self) -> bool {
        true
    }

    fn subscribe(&mut self) -> Result<Subscription, TrackerError> {
        let samples = self.samples.take().ok_or(TrackerError::AlreadySubscribed)?;
        let (sender, receiver) = mpsc::channel(FEED_CAPACITY);

        let feeder = tokio::spawn(async move {
            let start = Instant::now();
            let origin = samples.first().map_or(0, |s| s.timestamp_ms);
            for sample in samples {
                let offset = Duration::from_millis(sample.timestamp_ms.saturating_sub(origin));
                tokio::time::sleep_until(start + offset).await;
                if sender.send(sample).await.is_err() {
                    break;
                }
            }
            log::debug!("Recording finished");
        });

        Ok(Subscription::with_release(receiver, move || feeder.abort()))
    }
}
