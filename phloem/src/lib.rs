#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]
//!
//! # Threading Notes
//!
//! Jobs dispatched through any scheduler in this crate **may** run on a different thread than
//! the one that dispatched them, and in any order relative to each other.

pub mod runtime;

#[doc = include_str!("../README.md")]
mod readme {}
