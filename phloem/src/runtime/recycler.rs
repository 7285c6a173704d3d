use std::{
	fmt::Debug,
	io,
	panic::{catch_unwind, AssertUnwindSafe},
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc, Weak,
	},
	thread,
};

use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures_lite::{future::block_on, StreamExt};
use parking_lot::Mutex;

use super::{panic_message, Job, Rejected, SchedulerRef};

/// A [`SchedulerRef`] that runs each job on a worker thread and recycles workers.
///
/// # Logic
///
/// At most **one** idle worker is kept at any time.
///
/// - On dispatch, the idle worker is claimed if there is one. Otherwise, a new worker is spawned.
/// - A worker runs its job to completion and only then parks itself as *the* idle worker.
///   If another worker was parked already, that one is retired: the slot tracks the newest available worker.
/// - A job that is still running (for example because it blocks) keeps its worker busy,
///   so the next dispatch spawns a fresh worker instead of waiting.
///
/// Panics in jobs are caught and logged. The worker survives them.
///
/// Jobs dispatched through clones of the same [`Recycler`] share its slot, regardless of
/// which signal dispatched them. There is no ordering between jobs.
///
/// Once every clone of a [`Recycler`] is dropped, its idle worker exits.  
/// Busy workers exit after finishing their current job.
#[derive(Clone)]
pub struct Recycler {
	shared: Arc<Shared>,
}

struct Shared {
	name: String,
	idle: Mutex<Option<Worker>>,
	spawned: AtomicU64,
}

/// Handle to a worker thread. Dropping it retires that worker once it's idle.
struct Worker {
	id: u64,
	inbox: UnboundedSender<Assignment>,
}

/// The worker's own handle travels with its job, so that it can park itself afterwards.
struct Assignment {
	job: Job,
	worker: Worker,
}

impl Debug for Recycler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Recycler")
			.field("name", &self.shared.name)
			.field("idle", &self.shared.idle.lock().as_ref().map(|worker| worker.id))
			.field("spawned", &self.shared.spawned.load(Ordering::Relaxed))
			.finish()
	}
}

impl Default for Recycler {
	fn default() -> Self {
		Self::new()
	}
}

impl Recycler {
	/// Creates a new [`Recycler`] without starting any worker yet.
	#[must_use]
	pub fn new() -> Self {
		Self::with_name("phloem-worker")
	}

	/// Creates a new [`Recycler`] whose worker threads are named `"{name}-{n}"`.
	#[must_use]
	pub fn with_name(name: impl Into<String>) -> Self {
		Self {
			shared: Arc::new(Shared {
				name: name.into(),
				idle: Mutex::new(None),
				spawned: AtomicU64::new(0),
			}),
		}
	}

	/// Whether a worker is currently parked and ready for reuse.
	#[must_use]
	pub fn has_idle_worker(&self) -> bool {
		self.shared.idle.lock().is_some()
	}

	/// How many worker threads this [`Recycler`] has started so far.
	#[must_use]
	pub fn spawned_workers(&self) -> u64 {
		self.shared.spawned.load(Ordering::Relaxed)
	}

	fn claim_idle(&self) -> Option<Worker> {
		let claimed = self.shared.idle.lock().take();
		if let Some(worker) = &claimed {
			tracing::debug!(worker = worker.id, "reusing idle worker");
		}
		claimed
	}

	fn spawn(&self) -> io::Result<Worker> {
		let id = self.shared.spawned.fetch_add(1, Ordering::Relaxed) + 1;
		let (inbox, assignments) = mpsc::unbounded();
		let shared = Arc::downgrade(&self.shared);
		thread::Builder::new()
			.name(format!("{}-{id}", self.shared.name))
			.spawn(move || run_worker(id, &shared, assignments))?;
		tracing::debug!(worker = id, name = %self.shared.name, "spawned worker");
		Ok(Worker { id, inbox })
	}
}

impl Worker {
	fn assign(self, job: Job) -> Result<(), Job> {
		let inbox = self.inbox.clone();
		inbox
			.unbounded_send(Assignment { job, worker: self })
			.map_err(|error| error.into_inner().job)
	}
}

impl SchedulerRef for Recycler {
	fn dispatch(&self, job: Job) -> Result<(), Rejected> {
		let mut job = job;
		if let Some(worker) = self.claim_idle() {
			match worker.assign(job) {
				Ok(()) => return Ok(()),
				// The parked worker's thread is gone. Fall through to a fresh one.
				Err(returned) => job = returned,
			}
		}

		let worker = match self.spawn() {
			Ok(worker) => worker,
			Err(source) => return Err(Rejected::new(job, source)),
		};
		worker.assign(job).map_err(|job| {
			Rejected::new(
				job,
				io::Error::other("worker exited before receiving its first job"),
			)
		})
	}
}

fn run_worker(id: u64, shared: &Weak<Shared>, mut assignments: UnboundedReceiver<Assignment>) {
	while let Some(Assignment { job, worker }) = block_on(assignments.next()) {
		if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
			tracing::error!(
				worker = id,
				panic = panic_message(&*payload),
				"callback panicked on worker"
			);
		}

		let Some(shared) = shared.upgrade() else {
			break;
		};
		let displaced = shared.idle.lock().replace(worker);
		if let Some(displaced) = displaced {
			tracing::debug!(worker = displaced.id, by = id, "retiring displaced idle worker");
		}
	}
	tracing::debug!(worker = id, "worker retired");
}
