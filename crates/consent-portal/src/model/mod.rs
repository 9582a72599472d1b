//! Records and value types shared by the actors, the Bank ID flow and the session.

pub mod bankid;
pub mod consent;
pub mod study;
pub mod user;

pub use bankid::*;
pub use consent::*;
pub use study::*;
pub use user::*;
