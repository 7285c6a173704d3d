use std::{
	collections::{BTreeMap, HashMap},
	sync::Arc,
};

use crate::connection::{ConnectionId, RawConnection};

/// A signal's connections, keyed by [`ConnectionId`].
///
/// Ids increase monotonically, so [`Ordered`](`ConnectionSet::Ordered`) iterates in bind order.
/// [`Unordered`](`ConnectionSet::Unordered`) makes no promise whatsoever.
pub(crate) enum ConnectionSet<A> {
	Ordered(BTreeMap<ConnectionId, Arc<RawConnection<A>>>),
	Unordered(HashMap<ConnectionId, Arc<RawConnection<A>>>),
}

impl<A> ConnectionSet<A> {
	pub(crate) fn new(keep_order: bool) -> Self {
		if keep_order {
			Self::Ordered(BTreeMap::new())
		} else {
			Self::Unordered(HashMap::new())
		}
	}

	/// An empty set of the same kind.
	pub(crate) fn fresh(&self) -> Self {
		Self::new(matches!(self, Self::Ordered(_)))
	}

	pub(crate) fn len(&self) -> usize {
		match self {
			Self::Ordered(map) => map.len(),
			Self::Unordered(map) => map.len(),
		}
	}

	pub(crate) fn insert(&mut self, connection: Arc<RawConnection<A>>) {
		let previous = match self {
			Self::Ordered(map) => map.insert(connection.id(), connection),
			Self::Unordered(map) => map.insert(connection.id(), connection),
		};
		debug_assert!(previous.is_none(), "connection ids must be unique");
	}

	/// Removes `connection` iff this exact connection is present.
	///
	/// A different connection with an equal id (i.e. one from another signal) is left alone.
	pub(crate) fn remove(
		&mut self,
		connection: &Arc<RawConnection<A>>,
	) -> Option<Arc<RawConnection<A>>> {
		let id = connection.id();
		match self {
			Self::Ordered(map) => match map.get(&id) {
				Some(present) if Arc::ptr_eq(present, connection) => map.remove(&id),
				_ => None,
			},
			Self::Unordered(map) => match map.get(&id) {
				Some(present) if Arc::ptr_eq(present, connection) => map.remove(&id),
				_ => None,
			},
		}
	}

	/// Clones the current membership, in iteration order.
	pub(crate) fn snapshot(&self) -> Vec<Arc<RawConnection<A>>> {
		match self {
			Self::Ordered(map) => map.values().cloned().collect(),
			Self::Unordered(map) => map.values().cloned().collect(),
		}
	}
}
