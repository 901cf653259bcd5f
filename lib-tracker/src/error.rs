use std::{error::Error, fmt};

use tokio::task::JoinError;


#[derive(Debug)]
pub enum TrackerError
{
    /// The source already handed out its only listener.
    AlreadySubscribed,
    /// The platform refused to attach a listener.
    Subscribe(String),
    /// Tracking is over, commands can no longer be delivered.
    Stopped,
    /// The tracking task panicked or was cancelled.
    Task(JoinError),
}

impl Error for TrackerError {}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::AlreadySubscribed => write!(f, "Sensor listener is already subscribed"),
            Self::Subscribe(reason) => write!(f, "Could not subscribe to sensor: {}", reason),
            Self::Stopped => write!(f, "Tracking has stopped"),
            Self::Task(err) => write!(f, "Tracking task failed: {}", err),
        }
    }
}

impl From<JoinError> for TrackerError
{
    fn from(err: JoinError) -> Self {
        TrackerError::Task(err)
    }
}
