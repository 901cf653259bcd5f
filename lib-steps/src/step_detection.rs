use cfg_if::cfg_if;
use crate::*;

/// Emitted when a sample is accepted as a step.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent
{
    /// In milliseconds; timestamp of the sample that was accepted.
    pub timestamp_ms: u64,

    /// Step count of the session right after this step was counted.
    pub step_count: u32,
}

/// Why a sample was not counted as a step.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection
{
    /// The reading was NaN or infinite.
    NonFinite,
    /// The signal did not move more than `THRESHOLD` away from the last accepted value.
    BelowThreshold,
    /// A previous step still has its window open.
    WindowOpen,
    /// Less than `MIN_INTERVAL_MS` passed since the last accepted step.
    TooSoon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict
{
    Accepted,
    Rejected(Rejection),
}

/// Mutable state threaded through repeated sample processing for one tracking period.
///
#[derive(Debug, Clone, Default)]
pub struct DetectionSession
{
    step_count: u32,

    /// Vertical-axis value of the last accepted step.
    last_accepted_value: f32,

    /// In milliseconds; timestamp of the last accepted step, `None` until the first one.
    last_accepted_timestamp: Option<u64>,

    /// True while a debounce window is open.
    in_step_window: bool,
}

impl DetectionSession
{
    #[inline]
    pub fn new() -> Self {
        DetectionSession {
            step_count: 0,
            last_accepted_value: 0.0,
            last_accepted_timestamp: None,
            in_step_window: false,
        }
    }

    #[inline]
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    #[inline]
    pub fn last_accepted_value(&self) -> f32 {
        self.last_accepted_value
    }

    /// In milliseconds; reads as 0 before any step was accepted.
    ///
    #[inline]
    pub fn last_accepted_timestamp(&self) -> u64 {
        self.last_accepted_timestamp.unwrap_or(0)
    }

    #[inline]
    pub fn is_in_step_window(&self) -> bool {
        self.in_step_window
    }

    /// Decides whether the given sample would be accepted as a step, without touching the
    /// session.
    ///
    pub fn classify(&self, sample: &SensorSample) -> Verdict {
        if !sample.is_finite() {
            return Verdict::Rejected(Rejection::NonFinite);
        }

        if libm::fabsf(sample.value - self.last_accepted_value) <= THRESHOLD {
            return Verdict::Rejected(Rejection::BelowThreshold);
        }

        if self.in_step_window {
            return Verdict::Rejected(Rejection::WindowOpen);
        }

        // The spacing gate only applies once there is a previous step to be spaced from.
        if let Some(last) = self.last_accepted_timestamp {
            if sample.timestamp_ms.saturating_sub(last) <= MIN_INTERVAL_MS {
                return Verdict::Rejected(Rejection::TooSoon);
            }
        }

        Verdict::Accepted
    }

    /// Processes one sample. When it is accepted the step is counted, the window opens and the
    /// returned event tells the caller to close the window again after `DEBOUNCE_MS`.
    ///
    pub fn process_sample(&mut self, sample: &SensorSample) -> Option<StepEvent> {
        match self.classify(sample) {
            Verdict::Accepted => {
                self.step_count += 1;
                self.last_accepted_value = sample.value;
                self.last_accepted_timestamp = Some(sample.timestamp_ms);
                self.in_step_window = true;

                Some(StepEvent {
                    timestamp_ms: sample.timestamp_ms,
                    step_count: self.step_count,
                })
            }
            Verdict::Rejected(_reason) => {
                cfg_if!{ if #[cfg(feature = "debug")] {
                    log::trace!("sample at {} rejected: {:?}", sample.timestamp_ms, _reason);
                }}
                None
            }
        }
    }

    /// Timer driven transition that ends the debounce window. Closing an already closed window
    /// does nothing.
    ///
    #[inline]
    pub fn close_window(&mut self) {
        self.in_step_window = false;
    }

    /// Zeroes the step count. Detection state is left alone so a reset can never make the next
    /// sample count when it otherwise would not.
    ///
    #[inline]
    pub fn reset(&mut self) {
        self.step_count = 0;
    }

    /// Estimated calories for the current step count.
    ///
    #[inline]
    pub fn calories(&self) -> Calories {
        Calories::from_steps(self.step_count)
    }
}
