use std::{
	fmt::Debug,
	mem,
	panic::{catch_unwind, AssertUnwindSafe},
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc, Weak,
	},
};

use futures_channel::oneshot;
use futures_lite::future::block_on;
use parking_lot::Mutex;
use phloem::runtime::{Job, SchedulerRef};

#[cfg(feature = "global_scheduler")]
use phloem::runtime::GlobalScheduler;

use crate::{
	config::{Defaults, Options},
	connection::{Callback, Connection, ConnectionId, Detach, RawConnection},
	connection_set::ConnectionSet,
	Wait,
};

/// Type inference helper alias for [`SignalSR`] (using [`GlobalScheduler`]).
#[cfg(feature = "global_scheduler")]
pub type Signal<A> = SignalSR<A, GlobalScheduler>;

/// An event emitter: callbacks are [bound](`SignalSR::bind`) to it, and each [`fire`](`SignalSR::fire`)
/// delivers its arguments to all of them.
///
/// Arguments are a single value `A`. Use a tuple to pass several.
///
/// This is a cheaply cloneable handle. Clones refer to the same signal, which is dropped
/// along with its connections once the last handle is gone.
///
/// # Modes
///
/// Both are fixed on construction (see [`Options`]):
///
/// - **yieldable**: Callbacks are dispatched to the [`SchedulerRef`] `SR`, so [`fire`](`SignalSR::fire`)
///   never waits for them, and a panic in one is contained to its worker.
///   Otherwise, callbacks run inline on the firing thread, one after another, and a panicking
///   callback unwinds out of [`fire`](`SignalSR::fire`), skipping the remaining ones.
/// - **keep_order**: Callbacks are invoked (or dispatched, respectively) in the order they were bound.
///   Otherwise, the order is unspecified and may change between fires.
///
/// # Reentrancy
///
/// No lock is held while callbacks run, so callbacks may bind, unbind and fire freely.
///
/// Each [`fire`](`SignalSR::fire`) works on a snapshot of the connections taken when it starts:
/// Callbacks bound meanwhile are first called by the *next* fire. Callbacks unbound meanwhile are
/// still called by the current one, except for [`once`](`SignalSR::once`) callbacks, which check
/// whether they are still connected.
pub struct SignalSR<A: 'static + Send + Sync, SR: 'static + SchedulerRef> {
	raw: Arc<RawSignal<A, SR>>,
}

struct RawSignal<A, SR> {
	yieldable: bool,
	keep_order: bool,
	scheduler: SR,
	id_counter: AtomicU64,
	connections: Mutex<ConnectionSet<A>>,
}

impl<A: 'static + Send + Sync, SR: SchedulerRef> Detach<A> for RawSignal<A, SR> {
	fn detach(&self, connection: &Arc<RawConnection<A>>) {
		let removed = self.connections.lock().remove(connection);
		if removed.is_some() {
			tracing::trace!(connection = connection.id().get(), "detached connection");
		}
	}
}

impl<A: 'static + Send + Sync, SR: 'static + SchedulerRef> Clone for SignalSR<A, SR> {
	fn clone(&self) -> Self {
		Self {
			raw: Arc::clone(&self.raw),
		}
	}
}

impl<A: 'static + Send + Sync, SR: 'static + SchedulerRef + Debug> Debug for SignalSR<A, SR> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Signal")
			.field("yieldable", &self.raw.yieldable)
			.field("keep_order", &self.raw.keep_order)
			.field("connections", &self.len())
			.field("scheduler", &self.raw.scheduler)
			.finish()
	}
}

impl<A: 'static + Send + Sync, SR: 'static + SchedulerRef + Default> Default for SignalSR<A, SR> {
	fn default() -> Self {
		Self::new()
	}
}

impl<A: 'static + Send + Sync, SR: 'static + SchedulerRef> SignalSR<A, SR> {
	/// Creates a new signal with the process-wide [`Defaults`].
	#[must_use]
	pub fn new() -> Self
	where
		SR: Default,
	{
		Self::with_runtime(Options::new(), SR::default())
	}

	/// Creates a new signal, taking unset [`Options`] from the process-wide [`Defaults`].
	///
	/// ```
	/// use tendril::{Options, Signal};
	///
	/// let signal = Signal::<i32>::with_options(Options::new().yieldable(false).keep_order(true));
	/// assert!(!signal.is_yieldable());
	/// assert!(signal.keeps_order());
	/// ```
	#[must_use]
	pub fn with_options(options: Options) -> Self
	where
		SR: Default,
	{
		Self::with_runtime(options, SR::default())
	}

	/// Creates a new signal that dispatches yieldable callbacks to `scheduler`.
	#[must_use]
	pub fn with_runtime(options: Options, scheduler: SR) -> Self {
		let Defaults {
			yieldable,
			keep_order,
		} = match options {
			Options {
				yieldable: Some(yieldable),
				keep_order: Some(keep_order),
			} => Defaults {
				yieldable,
				keep_order,
			},
			// Only consult the process-wide defaults when needed, since that fixes them.
			_ => options.resolve(Defaults::current()),
		};

		Self {
			raw: Arc::new(RawSignal {
				yieldable,
				keep_order,
				scheduler,
				// Ids start at 1 to fit `NonZeroU64`.
				id_counter: AtomicU64::new(1),
				connections: Mutex::new(ConnectionSet::new(keep_order)),
			}),
		}
	}

	/// Whether callbacks are dispatched to the scheduler rather than run inline.
	#[must_use]
	pub fn is_yieldable(&self) -> bool {
		self.raw.yieldable
	}

	/// Whether callbacks are delivered in bind order.
	#[must_use]
	pub fn keeps_order(&self) -> bool {
		self.raw.keep_order
	}

	/// The scheduler yieldable callbacks are dispatched to.
	#[must_use]
	pub fn scheduler(&self) -> &SR {
		&self.raw.scheduler
	}

	/// The number of currently bound connections.
	#[must_use]
	pub fn len(&self) -> usize {
		self.raw.connections.lock().len()
	}

	/// Whether no connections are currently bound.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn register(
		&self,
		make_callback: impl FnOnce(Weak<RawConnection<A>>) -> Callback<A>,
	) -> Connection<A> {
		let id = ConnectionId::new(self.raw.id_counter.fetch_add(1, Ordering::Relaxed));
		let signal: Weak<RawSignal<A, SR>> = Arc::downgrade(&self.raw);
		let signal: Weak<dyn Detach<A>> = signal;
		let raw = Arc::new_cyclic(|this| RawConnection::new(id, make_callback(this.clone()), signal));
		self.raw.connections.lock().insert(Arc::clone(&raw));
		tracing::trace!(connection = id.get(), "bound connection");
		Connection::from_raw(raw)
	}

	/// Binds `callback` to run on each [`fire`](`SignalSR::fire`) until unbound.
	pub fn bind(&self, callback: impl 'static + Send + Sync + Fn(&A)) -> Connection<A> {
		self.register(|_| Box::new(callback))
	}

	/// Binds `callback` to run on the next [`fire`](`SignalSR::fire`) only.
	///
	/// On its first invocation, the connection unbinds itself, then calls `callback`.
	/// If the connection was unbound first (possibly concurrently), `callback` is not called.
	///
	/// **Returns** the [`Connection`], which can be unbound explicitly to cancel the call.
	pub fn once(&self, callback: impl 'static + Send + FnOnce(&A)) -> Connection<A> {
		let callback = Mutex::new(Some(callback));
		self.register(|this| {
			Box::new(move |args: &A| {
				let Some(this) = this.upgrade() else {
					return;
				};
				if this.unbind() {
					let callback = callback.lock().take();
					if let Some(callback) = callback {
						callback(args);
					}
				}
			})
		})
	}

	/// Unbinds `connection` iff it is currently bound to this signal.
	///
	/// Connections of other signals, already-unbound ones and ones removed by
	/// [`unbind_all`](`SignalSR::unbind_all`) are silently ignored.
	pub fn unbind(&self, connection: &Connection<A>) {
		let removed = self.raw.connections.lock().remove(connection.raw());
		if let Some(removed) = removed {
			removed.disconnect();
			tracing::trace!(connection = removed.id().get(), "unbound connection");
		}
	}

	/// Removes all connections at once.
	///
	/// Existing [`Connection`] handles are not touched: they still report
	/// [`is_connected`](`Connection::is_connected`), but are unreachable from this signal.
	/// Unbinding them later is a no-op.
	pub fn unbind_all(&self) {
		let cleared = {
			let mut connections = self.raw.connections.lock();
			let fresh = connections.fresh();
			mem::replace(&mut *connections, fresh)
		};
		tracing::trace!(connections = cleared.len(), "unbound all connections");
		// `cleared` drops outside the lock, since callback captures may call back into this signal.
	}

	/// Delivers `args` to all connections bound when this call starts.
	///
	/// Inline signals call each callback on this thread before returning.
	/// A callback that blocks delays all that follow it, and a panic propagates to the caller.
	///
	/// Yieldable signals hand each callback to their scheduler and return without waiting.
	/// If the scheduler rejects a callback, that one runs inline instead (with its panic contained).
	pub fn fire(&self, args: A) {
		let snapshot = self.raw.connections.lock().snapshot();
		tracing::trace!(
			connections = snapshot.len(),
			yieldable = self.raw.yieldable,
			"firing signal"
		);

		if !self.raw.yieldable {
			for connection in snapshot {
				connection.invoke(&args);
			}
			return;
		}

		let args = Arc::new(args);
		for connection in snapshot {
			let args = Arc::clone(&args);
			let job: Job = Box::new(move || connection.invoke(&args));
			if let Err(rejected) = self.raw.scheduler.dispatch(job) {
				let (job, error) = rejected.into_parts();
				tracing::warn!(%error, "scheduler rejected callback, running it inline");
				if catch_unwind(AssertUnwindSafe(job)).is_err() {
					tracing::error!("callback panicked while running inline in place of its worker");
				}
			}
		}
	}

	/// Resolves to the arguments of the next [`fire`](`SignalSR::fire`).
	///
	/// This is a [`once`](`SignalSR::once`) binding that sends a clone of the arguments to the returned [`Wait`].
	/// Dropping the [`Wait`] unbinds it.
	///
	/// # Hazard
	///
	/// There is no timeout. If this signal is dropped or [cleared](`SignalSR::unbind_all`) before
	/// firing again, the [`Wait`] never resolves.
	pub fn wait(&self) -> Wait<A>
	where
		A: Clone,
	{
		let (sender, receiver) = oneshot::channel();
		let connection = self.once(move |args: &A| {
			sender.send(args.clone()).ok();
		});
		Wait::new(receiver, connection)
	}

	/// Blocks the current thread until the next [`fire`](`SignalSR::fire`), then returns its arguments.
	///
	/// # Hazard
	///
	/// As [`wait`](`SignalSR::wait`), this may block forever.
	/// For inline signals, it **does** block forever unless another thread fires.
	#[must_use]
	pub fn wait_blocking(&self) -> A
	where
		A: Clone,
	{
		block_on(self.wait())
	}
}
