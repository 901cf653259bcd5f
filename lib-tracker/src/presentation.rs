use steps::{Calories, DetectionSession};
use tokio::sync::watch;

/// Values shown to the user.
///
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Readout
{
    pub steps: u32,

    /// A step window is open, i.e. the user is currently stepping.
    pub active: bool,

    pub calories: Calories,
}

impl Readout {

    /// `0 steps, idle`, also what is shown when there is no sensor.
    ///
    pub fn idle() -> Self {
        Readout::default()
    }

    pub fn from_session(session: &DetectionSession) -> Self {
        Readout {
            steps: session.step_count(),
            active: session.is_in_step_window(),
            calories: session.calories(),
        }
    }

    pub fn pose(&self) -> Pose {
        if self.active { Pose::Running } else { Pose::Sitting }
    }
}

/// Which animation to play.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose
{
    Running,
    Sitting,
}

/// Presentation collaborator, gets handed a new readout every time one of its values changes.
///
pub trait Presentation
{
    fn render(&mut self, readout: &Readout);
}

/// Lets a UI pull the latest readout whenever it redraws.
impl Presentation for watch::Sender<Readout> {
    fn render(&mut self, readout: &Readout) {
        self.send_replace(*readout);
    }
}
