//! Small helpers shared across the crate
//!
//! Amount formatting for display and the cancellation flag used by the
//! background workers.

pub mod cancellation;
pub mod format;

pub use cancellation::CancellationToken;
pub use format::to_comma_separated;
