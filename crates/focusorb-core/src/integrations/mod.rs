//! External collaborators consumed by the engine.
//!
//! The traits are the seams; the concrete types are the defaults the CLI
//! wires in when nothing better is available.

pub mod activity;
pub mod notify;
pub mod oracle;
pub mod traits;

pub use activity::{CommandActivitySource, NO_ACTIVITY_LABEL};
pub use notify::{DesktopNotifier, TracingNotifier};
pub use oracle::KeywordOracle;
pub use traits::{ActivitySource, Notifier, ProductivityOracle, Snapshot};
