//! Software currency evaluation: version policies, their lint, and the
//! per-device classifier. Everything here is pure; callers pass a [`JobLog`]
//! to collect the human-readable trail.
//!
//! [`JobLog`]: crate::models::JobLog

mod classify;
mod policy;
mod status;

pub use classify::*;
pub use policy::*;
pub use status::*;
