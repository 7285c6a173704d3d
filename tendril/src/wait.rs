use std::{
	future::Future,
	pin::Pin,
	task::{Context, Poll},
};

use futures_channel::oneshot;
use pin_project::{pin_project, pinned_drop};

use crate::Connection;

/// Resolves to (a clone of) the arguments of the next [`fire`](`crate::SignalSR::fire`).
///
/// Returned by [`SignalSR::wait`](`crate::SignalSR::wait`).
///
/// Dropping this future unbinds its [`once`](`crate::SignalSR::once`) connection,
/// so abandoned waits don't pile up on a quiet signal.
///
/// # Hazard
///
/// There is no timeout. If the signal is dropped or [cleared](`crate::SignalSR::unbind_all`)
/// before it fires again, this future **never** resolves.
#[pin_project(PinnedDrop)]
#[must_use = "futures do nothing unless polled"]
#[derive(Debug)]
pub struct Wait<A> {
	#[pin]
	receiver: oneshot::Receiver<A>,
	connection: Connection<A>,
}

impl<A> Wait<A> {
	pub(crate) fn new(receiver: oneshot::Receiver<A>, connection: Connection<A>) -> Self {
		Self {
			receiver,
			connection,
		}
	}
}

impl<A> Future for Wait<A> {
	type Output = A;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match self.project().receiver.poll(cx) {
			Poll::Ready(Ok(args)) => Poll::Ready(args),
			// The binding was dropped without firing. Nothing will ever wake this again.
			Poll::Ready(Err(oneshot::Canceled)) | Poll::Pending => Poll::Pending,
		}
	}
}

#[pinned_drop]
impl<A> PinnedDrop for Wait<A> {
	fn drop(self: Pin<&mut Self>) {
		self.project().connection.unbind();
	}
}
