//! Planner facade: lifecycle, input mailboxes and plan requests.

mod debug;
mod facade;
mod lifecycle;
mod mailbox;

pub use debug::{DebugSink, LogSink, NullSink, RateLimiter};
pub use facade::{Plan, Planner};
pub use lifecycle::{Lifecycle, Transition};
pub use mailbox::Mailbox;
