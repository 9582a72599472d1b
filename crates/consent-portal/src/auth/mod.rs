//! Turning a personal number into a logged-in [`User`](crate::model::User).

pub mod authenticator;

pub use authenticator::Authenticator;
