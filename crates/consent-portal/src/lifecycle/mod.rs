//! # Lifecycle
//!
//! [`Portal`] is the composition root: it creates every actor, wires the ones that depend
//! on others through `run(context)`, and owns the join handles for shutdown.
//!
//! ```rust,ignore
//! let portal = Portal::start(&PortalConfig::load(None)?)?;
//! let user = portal.login("19781012-6789").await?;
//! portal.logout();
//! portal.shutdown().await?;
//! ```
//!
//! Shutdown drops every client; each actor's `recv()` then returns `None` and the task
//! ends. The consent actor holds clones of the user and study clients, so those two stop
//! after it does. The dependency graph is acyclic, so channel closure is enough.

pub mod portal;

pub use portal::*;
