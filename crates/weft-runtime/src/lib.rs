#![forbid(unsafe_code)]

//! Weft Runtime
//!
//! This crate owns the per-frame machinery of a weft UI session.
//!
//! # Key Components
//!
//! - [`Scheduler`] - disposal, task, layout and visual queues for one session
//! - [`FrameHost`] - the seam between the scheduler and the element tree
//! - [`TaskToken`] - cancellable handle of a timed task
//! - [`UiConfig`] - policy-as-data configuration
//!
//! # Role in Weft
//! `weft-runtime` knows nothing about panels or tabs. The widget layer embeds
//! a [`Scheduler`] next to its element arena, implements [`FrameHost`] and
//! calls [`Scheduler::run_frame`] once per platform-loop iteration.

pub mod config;
#[cfg(feature = "subscriber")]
pub mod logging;
pub mod scheduler;

pub use config::{ConfigError, UiConfig};
pub use scheduler::{
    FrameHost, FrameReport, LayoutPassReport, Scheduler, TaskOutcome, TaskToken,
};
pub use web_time::{Duration, Instant};
