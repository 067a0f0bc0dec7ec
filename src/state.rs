use std::sync::Arc;

use crate::config::Config;
use crate::email::MailTransport;
use crate::error::AppError;
use crate::rate_limit::ContactRateLimiter;
use crate::records::RecordStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub mailer: Channel<dyn MailTransport>,
    pub records: Channel<dyn RecordStore>,
    pub contact_limiter: ContactRateLimiter,
}

/// An outbound collaborator as resolved at start-up.
pub enum Channel<T: ?Sized> {
    /// Not part of this deployment.
    Disabled,
    /// Configured but missing credentials; the reason is only logged.
    Unavailable(String),
    Ready(Arc<T>),
}

impl<T: ?Sized> Channel<T> {
    /// The collaborator if it is ready, `None` if disabled, and a
    /// configuration error if it was meant to be used but cannot be.
    pub fn resolve(&self) -> Result<Option<Arc<T>>, AppError> {
        match self {
            Channel::Disabled => Ok(None),
            Channel::Unavailable(reason) => Err(AppError::Configuration(reason.clone())),
            Channel::Ready(inner) => Ok(Some(Arc::clone(inner))),
        }
    }
}
