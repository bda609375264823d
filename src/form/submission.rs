use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_timer::Delay;
use log::debug;

pub type SubmissionFuture =
    Pin<Box<dyn Future<Output = Result<SubmissionResponse, SubmissionError>> + Send + 'static>>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubmissionResponse {
    pub success: bool,
    pub error_message: Option<String>,
}

impl SubmissionResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            error_message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
        }
    }

    pub fn into_result(self) -> Result<(), SubmissionError> {
        if self.success {
            return Ok(());
        }
        Err(SubmissionError::Rejected(
            self.error_message
                .unwrap_or_else(|| "The submission was rejected".to_string()),
        ))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubmissionError {
    Transport(String),
    Rejected(String),
}

impl Display for SubmissionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionError::Transport(error) => write!(f, "could not send the form: {error}"),
            SubmissionError::Rejected(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for SubmissionError {}

/// Delivers validated form values somewhere and reports whether they were
/// accepted.
pub trait SubmissionPort<T>: Send + Sync {
    fn submit(&self, request: T) -> SubmissionFuture;
}

impl<T, F> SubmissionPort<T> for F
where
    F: Fn(T) -> SubmissionFuture + Send + Sync,
{
    fn submit(&self, request: T) -> SubmissionFuture {
        (self)(request)
    }
}

/// Stand-in backend: waits `delay`, then accepts every request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SimulatedSubmission {
    delay: Duration,
}

impl SimulatedSubmission {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(2_000);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedSubmission {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

impl<T> SubmissionPort<T> for SimulatedSubmission
where
    T: Send + 'static,
{
    fn submit(&self, request: T) -> SubmissionFuture {
        let delay = self.delay;
        Box::pin(async move {
            debug!("simulating submission latency of {delay:?}");
            if !delay.is_zero() {
                Delay::new(delay).await;
            }
            drop(request);
            Ok(SubmissionResponse::accepted())
        })
    }
}
