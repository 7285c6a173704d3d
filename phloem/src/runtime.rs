//! The [`SchedulerRef`] seam, as well as functional [`Recycler`], [`Deferred`] and [`GlobalScheduler`] schedulers.

use std::{any::Any, fmt::Debug, io};

use thiserror::Error;

mod deferred;
mod recycler;

pub use deferred::Deferred;
pub use recycler::Recycler;

/// A unit of work handed to a [`SchedulerRef`].
pub type Job = Box<dyn 'static + Send + FnOnce()>;

/// Trait for handles that let signals refer to a specific scheduler (instance).
///
/// [`GlobalScheduler`] provides a usable default.
///
/// # Logic
///
/// A scheduler **must not** run two jobs on the same worker concurrently.
/// Dispatched jobs **may** run in any order, on any thread, and interleaved with
/// jobs dispatched by unrelated signals.
///
/// A job that panics **should** be isolated: the panic **must not** propagate into
/// [`dispatch`](`SchedulerRef::dispatch`), and **should not** prevent later jobs from running.
pub trait SchedulerRef: Send + Sync + Clone {
	/// Submits `job` to run eventually, without waiting for it.
	///
	/// # Logic
	///
	/// This method **must not** run `job` on the calling thread before returning,
	/// so that callers never block on a job's suspension points.
	///
	/// # Errors
	///
	/// Iff the scheduler can't accept `job`, it **must** hand it back through [`Rejected`],
	/// so that the caller can decide how to run it instead.
	fn dispatch(&self, job: Job) -> Result<(), Rejected>;
}

/// Returned by [`SchedulerRef::dispatch`] when a job could not be scheduled.
///
/// Contains the job, which has not run.
#[derive(Error)]
#[error("the scheduler rejected a job: {source}")]
pub struct Rejected {
	job: Job,
	#[source]
	source: io::Error,
}

impl Debug for Rejected {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Rejected")
			.field("job", &"..")
			.field("source", &self.source)
			.finish()
	}
}

impl Rejected {
	/// Wraps `job` together with the reason it couldn't be scheduled.
	#[must_use]
	pub fn new(job: Job, source: io::Error) -> Self {
		Self { job, source }
	}

	/// Recovers the job that wasn't scheduled.
	#[must_use]
	pub fn into_job(self) -> Job {
		self.job
	}

	/// Splits this error into the unscheduled job and the underlying cause.
	#[must_use]
	pub fn into_parts(self) -> (Job, io::Error) {
		(self.job, self.source)
	}
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(message) = payload.downcast_ref::<&'static str>() {
		*message
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.as_str()
	} else {
		"Box<dyn Any>"
	}
}

#[cfg(feature = "global_scheduler")]
static GLOBAL_RECYCLER: async_lock::OnceCell<Recycler> = async_lock::OnceCell::new();

/// A plain [`SchedulerRef`] implementation that represents a static [`Recycler`].
///
/// The [`Recycler`] is started on first dispatch, and its one idle worker is shared by
/// every signal that uses this scheduler.
///
/// # Logic
///
/// This makes no additional guarantees over those specified in [`SchedulerRef`]'s
/// and [`Recycler`]'s documentation.
#[cfg(feature = "global_scheduler")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobalScheduler;

#[cfg(feature = "global_scheduler")]
impl GlobalScheduler {
	/// The process-wide [`Recycler`] backing this scheduler.
	#[must_use]
	pub fn recycler(self) -> &'static Recycler {
		GLOBAL_RECYCLER.get_or_init_blocking(|| Recycler::with_name("tendril-worker"))
	}
}

#[cfg(feature = "global_scheduler")]
impl SchedulerRef for GlobalScheduler {
	fn dispatch(&self, job: Job) -> Result<(), Rejected> {
		self.recycler().dispatch(job)
	}
}
