#![allow(dead_code)]

use std::{
	future::Future,
	pin::Pin,
	task::{Context, Poll, RawWaker, RawWakerVTable, Waker},
};

/// Polls `f` once, expecting it to be done.
#[track_caller]
pub fn assert_ready<F: Future>(f: Pin<&mut F>) -> F::Output {
	match f.poll(&mut Context::from_waker(&waker())) {
		Poll::Ready(value) => value,
		Poll::Pending => panic!("Unexpectedly not ready!"),
	}
}

/// Polls `f` once, expecting it to still be pending. `f` can be polled again afterwards.
#[track_caller]
pub fn assert_pending<F: Future>(f: Pin<&mut F>) {
	match f.poll(&mut Context::from_waker(&waker())) {
		Poll::Ready(_) => panic!("Unexpectedly ready!"),
		Poll::Pending => (),
	}
}

fn waker() -> Waker {
	unsafe { Waker::from_raw(raw_waker()) }
}

fn raw_waker() -> RawWaker {
	RawWaker::new(&(), &RawWakerVTable::new(|_| raw_waker(), drop, drop, drop))
}
