//! # Domain Services
//!
//! Domain logic that doesn't naturally belong to a single entity.
//!
//! ## Services
//!
//! - **slug**: Game slug derivation
//! - **Mailer**: Port for account e-mails (password reset links)

mod mailer;
mod slug;

pub use mailer::Mailer;
#[cfg(test)]
pub use mailer::MockMailer;
pub use slug::slugify;
