use std::time::Duration;

use steps::{DetectionSession, SensorSample, StepEvent, DEBOUNCE_MS};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};

use crate::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command
{
    Reset,
    Stop,
}

/// What happened during one tracking period, returned once tracking stops.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary
{
    pub sensor_available: bool,

    /// Step count at the end of the session, i.e. since the last reset.
    pub steps: u32,

    /// Every accepted step, including the ones counted before a reset.
    pub steps_total: u32,

    pub samples_seen: u64,

    /// Samples thrown away because their reading was not a finite number.
    pub samples_discarded: u64,

    pub resets: u32,
}

/// Owns the detection session for one tracking period and is the only thing that mutates it.
/// Samples, the window timer and user commands all get handled on the same task.
///
pub struct Tracker<S, P>
{
    source: S,
    presentation: P,
    session: DetectionSession,
    summary: SessionSummary,
    last_render: Option<Readout>,
}

impl<S, P> Tracker<S, P>
where
    S: SampleSource + Send + 'static,
    P: Presentation + Send + 'static,
{
    fn new(source: S, presentation: P) -> Self {
        Tracker {
            source,
            presentation,
            session: DetectionSession::new(),
            summary: SessionSummary::default(),
            last_render: None,
        }
    }

    /// Starts tracking on a new task of the current tokio runtime.
    ///
    pub fn start(source: S, presentation: P) -> TrackerHandle {
        let (commands, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(Tracker::new(source, presentation).run(receiver));
        TrackerHandle { commands, task }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
    ) -> Result<SessionSummary, TrackerError> {
        log::info!("Starting step tracking");
        self.render();

        if !self.source.is_available() {
            log::warn!("Accelerometer not available on this device, step detection stays idle");
            self.idle(&mut commands).await;
            return Ok(self.finish());
        }

        let mut subscription = match self.source.subscribe() {
            Ok(subscription) => subscription,
            Err(err) => {
                log::warn!("{}, step detection stays idle", err);
                self.idle(&mut commands).await;
                return Ok(self.finish());
            }
        };
        self.summary.sensor_available = true;

        // Only armed while a step window is open.
        let window = time::sleep(Duration::ZERO);
        tokio::pin!(window);
        let mut window_pending = false;

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(Command::Reset) => self.reset(),
                    Some(Command::Stop) | None => break,
                },

                () = &mut window, if window_pending => {
                    window_pending = false;
                    self.session.close_window();
                    log::debug!("Step window closed");
                    self.render();
                }

                sample = subscription.recv() => match sample {
                    Some(sample) => {
                        if self.process(&sample).is_some() {
                            let deadline = Instant::now() + Duration::from_millis(DEBOUNCE_MS);
                            window.as_mut().reset(deadline);
                            window_pending = true;
                        }
                    }
                    None => {
                        log::info!("Sensor stopped delivering samples");
                        break;
                    }
                },
            }
        }

        drop(subscription);
        Ok(self.finish())
    }

    /// Without a sensor only user commands are left to handle, until stopped.
    ///
    async fn idle(&mut self, commands: &mut mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            match command {
                Command::Reset => self.reset(),
                Command::Stop => break,
            }
        }
    }

    fn process(&mut self, sample: &SensorSample) -> Option<StepEvent> {
        self.summary.samples_seen += 1;

        if !sample.is_finite() {
            self.summary.samples_discarded += 1;
            log::debug!("Discarding non-finite sample at {} ms", sample.timestamp_ms);
            return None;
        }

        let event = self.session.process_sample(sample)?;
        self.summary.steps_total += 1;
        log::debug!("Step {} at {} ms", event.step_count, event.timestamp_ms);
        self.render();
        Some(event)
    }

    fn reset(&mut self) {
        self.session.reset();
        self.summary.resets += 1;
        log::debug!("Step count reset");
        self.render();
    }

    /// Hands the readout to the presentation if anything changed since the last one.
    ///
    fn render(&mut self) {
        let readout = Readout::from_session(&self.session);
        if self.last_render != Some(readout) {
            self.presentation.render(&readout);
            self.last_render = Some(readout);
        }
    }

    fn finish(mut self) -> SessionSummary {
        self.summary.steps = self.session.step_count();
        log::info!(
            "Stopped step tracking: {} steps ({} total), {} kcal",
            self.summary.steps,
            self.summary.steps_total,
            self.session.calories()
        );
        self.summary
    }
}

/// Control side of a running tracker. Dropping it stops tracking.
///
pub struct TrackerHandle
{
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<Result<SessionSummary, TrackerError>>,
}

impl TrackerHandle {

    /// Sets the step count back to zero. Does not touch the step window.
    ///
    pub fn reset(&self) -> Result<(), TrackerError> {
        self.commands.send(Command::Reset).map_err(|_| TrackerError::Stopped)
    }

    /// Stops tracking, releasing the sensor listener.
    ///
    pub async fn stop(self) -> Result<SessionSummary, TrackerError> {
        // Fails only if the task already ended on its own, joining still reports how.
        let _ = self.commands.send(Command::Stop);
        self.task.await?
    }

    /// Waits for tracking to end by itself, e.g. when a recording ran out.
    ///
    pub async fn join(self) -> Result<SessionSummary, TrackerError> {
        let TrackerHandle { commands, task } = self;
        let result = task.await?;
        drop(commands);
        result
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
