//! Mail delivery.
//!
//! No SMTP transport is wired in; reset links are written to the log so
//! operators (and developers) can deliver them by hand.

use async_trait::async_trait;

use crate::domain::{Mailer, User};
use crate::shared::error::AppError;

/// [`Mailer`] that records outgoing mail in the application log.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, user: &User, reset_url: &str) -> Result<(), AppError> {
        tracing::info!(
            user_id = user.id,
            email = %user.email,
            reset_url,
            "Password reset e-mail"
        );
        Ok(())
    }
}
