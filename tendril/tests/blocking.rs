#![cfg(feature = "global_scheduler")]

use std::{
	panic::{catch_unwind, AssertUnwindSafe},
	sync::Arc,
	thread,
	time::{Duration, Instant},
};

use tendril::{Options, Signal};

use _validator::Validator;

fn ordered_inline<A: 'static + Send + Sync>() -> Signal<A> {
	Signal::with_options(Options::new().yieldable(false).keep_order(true))
}

#[test]
fn blocking_callback_delays_its_siblings() {
	const DELAY: Duration = Duration::from_millis(100);

	let v = Arc::new(Validator::new());
	let signal = ordered_inline::<Instant>();

	signal.bind({
		let v = Arc::clone(&v);
		move |fired| {
			thread::sleep(DELAY);
			v.push(("slow", fired.elapsed() >= DELAY));
		}
	});
	signal.bind({
		let v = Arc::clone(&v);
		move |fired| v.push(("fast", fired.elapsed() >= DELAY))
	});

	let fired = Instant::now();
	signal.fire(fired);
	assert!(fired.elapsed() >= DELAY);
	v.expect([("slow", true), ("fast", true)]);
}

#[test]
fn panic_propagates_and_skips_the_rest() {
	let v = Arc::new(Validator::new());
	let signal = ordered_inline::<()>();

	let panicking = signal.bind(|()| panic!("listener failure"));
	signal.bind({
		let v = Arc::clone(&v);
		move |()| v.push("after")
	});

	let result = catch_unwind(AssertUnwindSafe(|| signal.fire(())));
	assert!(result.is_err());
	v.expect([]);

	// The signal stays usable.
	panicking.unbind();
	signal.fire(());
	v.expect(["after"]);
}

#[test]
fn reentrant_fire() {
	let v = Arc::new(Validator::new());
	let signal = ordered_inline::<u32>();

	signal.bind({
		let (v, signal) = (Arc::clone(&v), signal.clone());
		move |depth| {
			v.push(*depth);
			if *depth < 3 {
				signal.fire(depth + 1);
			}
		}
	});

	signal.fire(0);
	v.expect([0, 1, 2, 3]);

	signal.unbind_all();
}

#[test]
fn fire_with_no_listeners() {
	let signal = ordered_inline::<String>();
	signal.fire("nobody".to_owned());
	assert!(signal.is_empty());
}
