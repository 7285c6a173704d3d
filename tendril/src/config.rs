//! Process-wide [`Defaults`] and per-signal [`Options`].
//!
//! The defaults are consulted once, the first time a signal is created without explicit
//! settings (or [`Defaults::current`] is called). Until then, they can be replaced with
//! [`Defaults::install`]. If nothing was installed, they are read from the environment,
//! and a missing environment is not an error.

use std::env;

use async_lock::OnceCell;
use thiserror::Error;

/// Environment variable overriding [`Defaults::yieldable`].
pub const YIELDABLE_VAR: &str = "TENDRIL_YIELDABLE";

/// Environment variable overriding [`Defaults::keep_order`].
pub const KEEP_ORDER_VAR: &str = "TENDRIL_KEEP_ORDER";

static DEFAULTS: OnceCell<Defaults> = OnceCell::new();

/// The settings used for signals that don't specify their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Defaults {
	/// Whether callbacks are dispatched to a scheduler instead of running inline.
	pub yieldable: bool,
	/// Whether callbacks are delivered in the order they were bound.
	pub keep_order: bool,
}

impl Default for Defaults {
	fn default() -> Self {
		Self::LIBRARY
	}
}

impl Defaults {
	/// The built-in defaults: inline delivery in unspecified order.
	pub const LIBRARY: Self = Self {
		yieldable: false,
		keep_order: false,
	};

	/// [`Defaults::LIBRARY`], overridden by [`YIELDABLE_VAR`] and [`KEEP_ORDER_VAR`] where set.
	///
	/// Values that can't be [parsed](`parse_flag`) are logged and ignored.
	#[must_use]
	pub fn from_env() -> Self {
		Self::LIBRARY.overridden_by(|key| env::var(key).ok())
	}

	/// Overrides fields of `self` with flags found through `lookup`, by environment variable name.
	///
	/// Missing keys keep the current value. Values that can't be [parsed](`parse_flag`) are logged and ignored.
	#[must_use]
	pub fn overridden_by(self, mut lookup: impl FnMut(&str) -> Option<String>) -> Self {
		Self {
			yieldable: flag_or(&mut lookup, YIELDABLE_VAR, self.yieldable),
			keep_order: flag_or(&mut lookup, KEEP_ORDER_VAR, self.keep_order),
		}
	}

	/// Sets the process-wide defaults.
	///
	/// # Errors
	///
	/// Iff the process-wide defaults were already installed or already consulted,
	/// returns `self` unchanged.
	pub fn install(self) -> Result<(), Self> {
		DEFAULTS.set_blocking(self).map(|_| ())
	}

	/// The process-wide defaults.
	///
	/// The first call without a prior [`install`](`Defaults::install`) fixes them to [`Defaults::from_env`].
	#[must_use]
	pub fn current() -> Self {
		*DEFAULTS.get_or_init_blocking(Self::from_env)
	}
}

fn flag_or(lookup: &mut impl FnMut(&str) -> Option<String>, key: &str, fallback: bool) -> bool {
	match lookup(key).as_deref().map(parse_flag) {
		None => fallback,
		Some(Ok(flag)) => flag,
		Some(Err(error)) => {
			tracing::warn!(key, %error, fallback, "ignoring unparsable signal default");
			fallback
		}
	}
}

/// A configuration value that isn't a recognised boolean flag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{value:?} is not a boolean flag (expected 1/true/yes/on or 0/false/no/off)")]
pub struct FlagError {
	value: String,
}

/// Parses `1`, `true`, `yes`, `on` and `0`, `false`, `no`, `off`, ignoring case and surrounding whitespace.
///
/// # Errors
///
/// Iff `value` is none of these.
pub fn parse_flag(value: &str) -> Result<bool, FlagError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(FlagError {
			value: value.to_owned(),
		}),
	}
}

/// Per-signal settings. Unset fields fall back to the process-wide [`Defaults`].
///
/// ```
/// use tendril::Options;
///
/// let options = Options::new().keep_order(true);
/// assert_eq!(options.yieldable, None);
/// assert_eq!(options.keep_order, Some(true));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Options {
	/// See [`Defaults::yieldable`].
	pub yieldable: Option<bool>,
	/// See [`Defaults::keep_order`].
	pub keep_order: Option<bool>,
}

impl Options {
	/// All settings unset.
	#[must_use]
	pub const fn new() -> Self {
		Self {
			yieldable: None,
			keep_order: None,
		}
	}

	/// Sets whether the signal dispatches callbacks to its scheduler.
	#[must_use]
	pub const fn yieldable(self, yieldable: bool) -> Self {
		Self {
			yieldable: Some(yieldable),
			..self
		}
	}

	/// Sets whether the signal delivers in bind order.
	#[must_use]
	pub const fn keep_order(self, keep_order: bool) -> Self {
		Self {
			keep_order: Some(keep_order),
			..self
		}
	}

	/// Fills unset fields from `defaults`.
	#[must_use]
	pub fn resolve(self, defaults: Defaults) -> Defaults {
		Defaults {
			yieldable: self.yieldable.unwrap_or(defaults.yieldable),
			keep_order: self.keep_order.unwrap_or(defaults.keep_order),
		}
	}
}
