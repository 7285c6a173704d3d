#![cfg(feature = "global_scheduler")]

use std::{
	pin::pin,
	thread,
	time::{Duration, Instant},
};

use futures_lite::future::block_on;
use tendril::{Options, Recycler, Signal, SignalSR};

mod _block_on;
use _block_on::{assert_pending, assert_ready};

fn inline<A: 'static + Send + Sync>() -> Signal<A> {
	Signal::with_options(Options::new().yieldable(false).keep_order(true))
}

#[test]
fn returns_fired_arguments() {
	let signal = inline::<(i32, &'static str)>();

	let mut wait = pin!(signal.wait());
	assert_pending(wait.as_mut());
	assert_eq!(signal.len(), 1);

	signal.fire((1, "a"));
	assert_eq!(assert_ready(wait.as_mut()), (1, "a"));
	assert!(signal.is_empty());
}

#[test]
fn resumes_only_for_the_next_fire() {
	let signal = inline::<u32>();

	signal.fire(1);
	let mut wait = pin!(signal.wait());
	assert_pending(wait.as_mut());

	signal.fire(2);
	signal.fire(3);
	assert_eq!(assert_ready(wait.as_mut()), 2);
}

#[test]
fn concurrent_waiters_all_resume() {
	let signal = inline::<u32>();

	let mut first = pin!(signal.wait());
	let mut second = pin!(signal.wait());
	signal.fire(9);

	assert_eq!(assert_ready(first.as_mut()), 9);
	assert_eq!(assert_ready(second.as_mut()), 9);
}

#[test]
fn blocking_wait_from_another_thread() {
	let signal = inline::<(i32, String)>();

	let waiter = thread::spawn({
		let signal = signal.clone();
		move || signal.wait_blocking()
	});

	let deadline = Instant::now() + Duration::from_secs(5);
	while signal.is_empty() {
		assert!(Instant::now() < deadline, "the waiter never bound");
		thread::yield_now();
	}

	signal.fire((2, "b".to_owned()));
	assert_eq!(waiter.join().unwrap(), (2, "b".to_owned()));
}

#[test]
fn yieldable_wait() {
	let signal = SignalSR::<&'static str, _>::with_runtime(
		Options::new().yieldable(true).keep_order(false),
		Recycler::new(),
	);

	let wait = signal.wait();
	signal.fire("from a worker");
	assert_eq!(block_on(wait), "from a worker");
}

#[test]
fn never_resumes_after_unbind_all() {
	let signal = inline::<()>();

	let mut wait = pin!(signal.wait());
	signal.unbind_all();
	signal.fire(());
	assert_pending(wait.as_mut());
	assert_pending(wait.as_mut());
}

#[test]
fn never_resumes_after_drop() {
	let signal = inline::<()>();

	let mut wait = pin!(signal.wait());
	drop(signal);
	assert_pending(wait.as_mut());
}

#[test]
fn dropping_the_wait_unbinds() {
	let signal = inline::<u8>();

	for _ in 0..3 {
		drop(signal.wait());
	}
	assert!(signal.is_empty());

	let mut wait = pin!(signal.wait());
	assert_eq!(signal.len(), 1);
	signal.fire(5);
	assert_eq!(assert_ready(wait.as_mut()), 5);
}
