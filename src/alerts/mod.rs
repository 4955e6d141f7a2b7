//! Threshold check and warning delivery
//!
//! Runs one pass over the most recent readings of a channel and emails a
//! warning when a filtered reading falls outside the configured thresholds.

pub mod checker;
pub mod message;
pub mod notifier;

pub use checker::{evaluate, CheckError, CheckOutcome, CheckReport, Checker, NotificationStatus};
pub use message::WarningMessage;
pub use notifier::{EmailNotifier, NotifierError};
