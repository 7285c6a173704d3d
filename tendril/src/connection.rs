use std::{
	fmt::Debug,
	num::NonZeroU64,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Weak,
	},
};

/// Identifies a [`Connection`] within its signal.
///
/// Ids are handed out in bind order and never reused by the same signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(NonZeroU64);

impl ConnectionId {
	pub(crate) fn new(raw: u64) -> Self {
		Self(raw.try_into().expect("infallible within reasonable time"))
	}

	/// The numeric value of this id.
	#[must_use]
	pub fn get(self) -> u64 {
		self.0.get()
	}
}

pub(crate) type Callback<A> = Box<dyn 'static + Send + Sync + Fn(&A)>;

/// Lets a connection remove itself from its signal without naming the signal's scheduler.
pub(crate) trait Detach<A>: Send + Sync {
	fn detach(&self, connection: &Arc<RawConnection<A>>);
}

pub(crate) struct RawConnection<A> {
	id: ConnectionId,
	connected: AtomicBool,
	callback: Callback<A>,
	signal: Weak<dyn Detach<A>>,
}

impl<A> RawConnection<A> {
	pub(crate) fn new(id: ConnectionId, callback: Callback<A>, signal: Weak<dyn Detach<A>>) -> Self {
		Self {
			id,
			connected: AtomicBool::new(true),
			callback,
			signal,
		}
	}

	pub(crate) fn id(&self) -> ConnectionId {
		self.id
	}

	pub(crate) fn is_connected(&self) -> bool {
		self.connected.load(Ordering::Acquire)
	}

	pub(crate) fn invoke(&self, args: &A) {
		(self.callback)(args);
	}

	/// **Returns** whether this call flipped `connected` (i.e. `false` iff it was already unbound).
	pub(crate) fn disconnect(&self) -> bool {
		self.connected.swap(false, Ordering::AcqRel)
	}

	/// Marks this connection as unbound, *then* removes it from its signal (if that still exists).
	///
	/// **Returns** whether this call flipped `connected`.
	pub(crate) fn unbind(self: &Arc<Self>) -> bool {
		let flipped = self.disconnect();
		if let Some(signal) = self.signal.upgrade() {
			signal.detach(self);
		}
		flipped
	}
}

/// A handle to one bound callback.
///
/// Dropping a [`Connection`] does **not** unbind it. Use [`.unbind()`](`Connection::unbind`) for that.
///
/// Connections don't keep their signal alive.
pub struct Connection<A> {
	raw: Arc<RawConnection<A>>,
}

impl<A> Clone for Connection<A> {
	fn clone(&self) -> Self {
		Self {
			raw: Arc::clone(&self.raw),
		}
	}
}

impl<A> Debug for Connection<A> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Connection")
			.field("id", &self.raw.id)
			.field("connected", &self.raw.is_connected())
			.finish_non_exhaustive()
	}
}

impl<A> Connection<A> {
	pub(crate) fn from_raw(raw: Arc<RawConnection<A>>) -> Self {
		Self { raw }
	}

	pub(crate) fn raw(&self) -> &Arc<RawConnection<A>> {
		&self.raw
	}

	/// This connection's id within its signal.
	#[must_use]
	pub fn id(&self) -> ConnectionId {
		self.raw.id
	}

	/// `true` from creation until this connection is unbound through [`.unbind()`](`Connection::unbind`)
	/// or its signal's [`unbind`](`crate::SignalSR::unbind`).
	///
	/// Note that [`unbind_all`](`crate::SignalSR::unbind_all`) leaves this flag as-is.
	#[must_use]
	pub fn is_connected(&self) -> bool {
		self.raw.is_connected()
	}

	/// Unbinds this connection from its signal.
	///
	/// **Idempotent.** Unbinding an already-unbound connection, or one whose signal was
	/// cleared with [`unbind_all`](`crate::SignalSR::unbind_all`) or dropped, does nothing.
	pub fn unbind(&self) {
		if self.raw.unbind() {
			tracing::trace!(connection = self.raw.id.get(), "unbound connection");
		}
	}
}
