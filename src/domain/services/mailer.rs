//! Outbound account e-mail.

use async_trait::async_trait;

use crate::domain::User;
use crate::shared::error::AppError;

/// Delivers account e-mails. The transport lives in the infrastructure layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the password reset link to `user`.
    async fn send_password_reset(&self, user: &User, reset_url: &str) -> Result<(), AppError>;
}
