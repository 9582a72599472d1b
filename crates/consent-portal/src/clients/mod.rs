//! Typed clients over the generic `ResourceClient`, one per record actor.

pub mod consent_client;
pub mod order_client;
pub mod study_client;
pub mod user_client;

pub use consent_client::ConsentClient;
pub use order_client::OrderClient;
pub use study_client::StudyClient;
pub use user_client::UserClient;
