#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]
//!
//! # Threading Notes
//!
//! All handles in this crate are [`Send`] and [`Sync`]. Callbacks therefore must be, too.
//!
//! In yieldable mode, callbacks run on scheduler workers, in no particular order relative
//! to each other, even if the signal [keeps order](`SignalSR::keeps_order`): only the *dispatch*
//! order is kept then.

pub mod config;
pub use config::{Defaults, Options};

mod connection;
pub use connection::{Connection, ConnectionId};

mod connection_set;

mod signal;
#[cfg(feature = "global_scheduler")]
pub use signal::Signal;
pub use signal::SignalSR;

mod wait;
pub use wait::Wait;

#[cfg(feature = "global_scheduler")]
pub use phloem::runtime::GlobalScheduler;
pub use phloem::runtime::{Deferred, Job, Recycler, Rejected, SchedulerRef};

#[doc = include_str!("../README.md")]
mod readme {}
