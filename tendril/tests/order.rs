#![cfg(feature = "global_scheduler")]

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use tendril::{Connection, Options, Signal};

use _validator::Validator;

fn ordered_inline<A: 'static + Send + Sync>() -> Signal<A> {
	Signal::with_options(Options::new().yieldable(false).keep_order(true))
}

#[test]
fn bind_order() {
	let v = Arc::new(Validator::new());
	let signal = ordered_inline::<i32>();

	signal.bind({
		let v = Arc::clone(&v);
		move |value| v.push(("cb1", *value))
	});
	signal.bind({
		let v = Arc::clone(&v);
		move |value| v.push(("cb2", *value))
	});

	signal.fire(42);
	v.expect([("cb1", 42), ("cb2", 42)]);

	signal.fire(43);
	v.expect([("cb1", 43), ("cb2", 43)]);
}

#[test]
fn order_survives_unbinding() {
	let v = Arc::new(Validator::new());
	let signal = ordered_inline::<()>();

	let bind = |label: u32| {
		let v = Arc::clone(&v);
		signal.bind(move |()| v.push(label))
	};

	let connections: Vec<_> = (1..=5).map(&bind).collect();
	connections[1].unbind();
	signal.unbind(&connections[3]);
	bind(6);
	bind(7);

	signal.fire(());
	v.expect([1, 3, 5, 6, 7]);
}

#[test]
fn unordered_delivers_to_everyone() {
	let v = Arc::new(Validator::new());
	let signal = Signal::<u32>::with_options(Options::new().yieldable(false).keep_order(false));
	assert!(!signal.keeps_order());

	for label in 0..16 {
		let v = Arc::clone(&v);
		signal.bind(move |value| v.push((label, *value)));
	}

	signal.fire(7);
	v.expect_unordered((0..16).map(|label| (label, 7)));
}

#[test]
fn once_keeps_its_place() {
	let v = Arc::new(Validator::new());
	let signal = ordered_inline::<()>();

	signal.bind({
		let v = Arc::clone(&v);
		move |()| v.push("a")
	});
	signal.once({
		let v = Arc::clone(&v);
		move |()| v.push("once")
	});
	signal.bind({
		let v = Arc::clone(&v);
		move |()| v.push("b")
	});

	signal.fire(());
	v.expect(["a", "once", "b"]);

	signal.fire(());
	v.expect(["a", "b"]);
}

proptest! {
	/// `true` binds a new listener, `false` unbinds the oldest listener that is still bound.
	#[test]
	fn fires_in_registration_order(operations in prop::collection::vec(any::<bool>(), 0..64)) {
		let delivered = Arc::new(Mutex::new(Vec::new()));
		let signal = ordered_inline::<()>();

		let mut bound: Vec<(usize, Connection<()>)> = Vec::new();
		for (label, bind) in operations.into_iter().enumerate() {
			if bind {
				let delivered = Arc::clone(&delivered);
				let connection = signal.bind(move |()| delivered.lock().unwrap().push(label));
				bound.push((label, connection));
			} else if !bound.is_empty() {
				bound.remove(0).1.unbind();
			}
		}

		signal.fire(());
		let expected: Vec<usize> = bound.iter().map(|(label, _)| *label).collect();
		prop_assert_eq!(&*delivered.lock().unwrap(), &expected);
		prop_assert_eq!(signal.len(), expected.len());
	}
}

#[test]
fn ids_count_up_from_one() {
	let signal = ordered_inline::<()>();

	let ids: Vec<u64> = (0..3).map(|_| signal.bind(|()| ()).id().get()).collect();
	assert_eq!(ids, [1, 2, 3]);

	signal.unbind_all();
	assert_eq!(signal.once(|()| ()).id().get(), 4);
}
