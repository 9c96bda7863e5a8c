use crate::cancel::{CancelHandle, CancelSource, CancelToken};
use crate::error::ExecuteError;
use crate::executor::{Executor, HttpExecutor, Response};
use crate::options::RequestOptions;
use tracing::debug;

/// The terminal event of one task run.  Exactly one variant is produced per
/// run, and producing it consumes the task, so no channel can ever fire
/// twice or alongside another.
#[derive(Debug)]
pub enum Outcome {
    /// The request completed with a success status.
    Success(Response),
    /// The request completed with a non-success status, or did not complete
    /// at all.  Never produced for an aborted run.
    Failure(ExecuteError),
    /// The run was cancelled, before or during the request, carrying the
    /// reason recorded at trigger time.
    Cancelled(Option<String>),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled(_))
    }

    /// The response, if this outcome is a success.
    pub fn success(self) -> Option<Response> {
        match self {
            Outcome::Success(response) => Some(response),
            _ => None,
        }
    }

    /// The error, if this outcome is a failure.
    pub fn failure(self) -> Option<ExecuteError> {
        match self {
            Outcome::Failure(err) => Some(err),
            _ => None,
        }
    }

    /// The cancellation reason, when this outcome is a cancellation that
    /// recorded one.
    pub fn cancel_reason(&self) -> Option<&str> {
        match self {
            Outcome::Cancelled(Some(reason)) => Some(reason),
            _ => None,
        }
    }
}

/// A lazy, cancellable description of a single HTTP request.
///
/// Construction performs no I/O: it allocates a cancellation signal for this
/// instance and merges it into the options (a caller-supplied token wins).
/// The network call happens only when [`run`](RequestTask::run) is awaited,
/// and happens at most once.
///
/// [`cancel_handle`](RequestTask::cancel_handle) is available from
/// construction onward.  The handle triggers whichever token is actually
/// attached to the request, so it is interchangeable with a caller-held
/// [`CancelSource`]: either one, triggered before the run settles, yields a
/// `Cancelled` outcome; triggered after, it is a silent no-op.
#[derive(Debug)]
pub struct RequestTask<E: Executor = HttpExecutor> {
    executor: E,
    options: RequestOptions,
    cancel: CancelToken,
}

impl RequestTask<HttpExecutor> {
    /// Describe a request to be executed by the default [`HttpExecutor`].
    pub fn new(options: RequestOptions) -> Result<Self, ExecuteError> {
        Ok(Self::with_executor(HttpExecutor::new()?, options))
    }
}

impl<E: Executor> RequestTask<E> {
    /// Describe a request to be executed by the given executor.
    pub fn with_executor(executor: E, options: RequestOptions) -> Self {
        let internal = CancelSource::new();
        let (options, cancel) = options.merge_cancel_token(internal.token());
        Self {
            executor,
            options,
            cancel,
        }
    }

    /// The cancellation routine for this task.  Available before the task
    /// runs; cancelling then means the executor is never invoked.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(self.cancel.clone())
    }

    /// The options this task will execute, after merging in its cancellation
    /// token.
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Perform the request and settle on exactly one [`Outcome`].
    pub async fn run(self) -> Outcome {
        if self.cancel.is_cancelled() {
            debug!(url = %self.options.url(), "task cancelled before dispatch");
            return Outcome::Cancelled(self.cancel.reason());
        }

        match self.executor.execute(&self.options).await {
            Ok(response) => Outcome::Success(response),
            Err(ExecuteError::Aborted(reason)) => Outcome::Cancelled(reason),
            Err(err) => Outcome::Failure(err),
        }
    }
}

/// Describe a request for the default executor; shorthand for
/// [`RequestTask::new`].
pub fn request(options: RequestOptions) -> Result<RequestTask, ExecuteError> {
    RequestTask::new(options)
}
