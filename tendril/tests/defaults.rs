#![cfg(feature = "global_scheduler")]

//! Process-wide defaults can only be installed once, so this binary holds a single test.

use tendril::{Defaults, Options, Signal};

#[test]
fn installed_defaults_apply() {
	let installed = Defaults {
		yieldable: true,
		keep_order: true,
	};
	assert_eq!(installed.install(), Ok(()));
	assert_eq!(
		Defaults::LIBRARY.install(),
		Err(Defaults::LIBRARY),
		"defaults are fixed after the first install"
	);
	assert_eq!(Defaults::current(), installed);

	let signal = Signal::<()>::new();
	assert!(signal.is_yieldable());
	assert!(signal.keeps_order());

	let signal = Signal::<()>::with_options(Options::new().yieldable(false));
	assert!(!signal.is_yieldable());
	assert!(signal.keeps_order());

	let signal = Signal::<()>::default();
	assert!(signal.is_yieldable());
}
