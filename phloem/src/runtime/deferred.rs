use std::{
	collections::VecDeque,
	fmt::Debug,
	panic::{catch_unwind, AssertUnwindSafe},
	sync::Arc,
};

use parking_lot::Mutex;

use super::{panic_message, Job, Rejected, SchedulerRef};

/// A cooperative [`SchedulerRef`] that only runs jobs when asked to.
///
/// [`dispatch`](`SchedulerRef::dispatch`) enqueues and returns immediately.
/// [`run_pending`](`Deferred::run_pending`) then runs the queue on the calling thread.
///
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct Deferred {
	queue: Arc<Mutex<VecDeque<Job>>>,
}

impl Debug for Deferred {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Deferred")
			.field("pending", &self.len())
			.finish()
	}
}

impl Deferred {
	/// Creates a new [`Deferred`] with an empty queue.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// The number of queued jobs.
	#[must_use]
	pub fn len(&self) -> usize {
		self.queue.lock().len()
	}

	/// Whether no jobs are queued.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.queue.lock().is_empty()
	}

	/// Runs queued jobs in FIFO order until the queue is empty,
	/// including jobs that are dispatched while this runs.
	///
	/// Panics in jobs are caught and logged, and don't stop the remaining jobs.
	///
	/// **Returns** how many jobs ran.
	pub fn run_pending(&self) -> usize {
		let mut ran = 0;
		loop {
			let Some(job) = self.queue.lock().pop_front() else {
				break;
			};
			if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
				tracing::error!(panic = panic_message(&*payload), "deferred callback panicked");
			}
			ran += 1;
		}
		ran
	}
}

impl SchedulerRef for Deferred {
	fn dispatch(&self, job: Job) -> Result<(), Rejected> {
		self.queue.lock().push_back(job);
		Ok(())
	}
}
