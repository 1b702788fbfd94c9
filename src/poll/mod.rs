//! One poll from posting to the results announcement.
//!
//! The [`controller::PollLifecycle`] runs the stages of [`stage::LifecycleStage`]
//! strictly in order. Timing comes from [`schedule::PollSchedule`], results
//! from [`tally::Tally`], and every chat text from [`messages`].

pub mod controller;
pub mod messages;
pub mod schedule;
pub mod stage;
pub mod tally;

pub use controller::{cleanup_targets, ActivePoll, LifecycleReport, PollLifecycle};
pub use schedule::PollSchedule;
pub use stage::LifecycleStage;
pub use tally::{Outcome, Tally};
