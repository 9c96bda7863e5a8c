use crate::executor::Response;
use reqwest::StatusCode;
use thiserror::Error;

/// Terminal failure of a single request execution.
///
/// `Aborted` is a routing signal rather than a failure: executors use it to
/// report that the attached cancellation token fired, and
/// [`RequestTask::run`](crate::RequestTask::run) remaps it to
/// [`Outcome::Cancelled`](crate::Outcome::Cancelled), so it is never seen on
/// the failure channel of a task.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The server delivered a response with a non-success status.  The full
    /// response, body included, is preserved.
    #[error("request failed with status {}", .0.status())]
    Status(Response),

    /// The transport failed before a usable response was delivered
    /// (connection error, timeout, interrupted body).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request options could not be turned into a request (unparseable
    /// URL, malformed header).  Surfaces on the failure channel without any
    /// network side effect.
    #[error("invalid request options: {0}")]
    InvalidOptions(String),

    /// The execution was aborted by its cancellation token, with the reason
    /// recorded at trigger time.
    #[error("request aborted{}", .0.as_ref().map(|r| format!(": {}", r)).unwrap_or_default())]
    Aborted(Option<String>),
}

impl ExecuteError {
    /// The HTTP status code associated with this error, for both `Status`
    /// errors and transport errors that carry one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ExecuteError::Status(response) => Some(response.status()),
            ExecuteError::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// The full response for `Status` errors.
    pub fn response(&self) -> Option<&Response> {
        match self {
            ExecuteError::Status(response) => Some(response),
            _ => None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, ExecuteError::Aborted(_))
    }
}
