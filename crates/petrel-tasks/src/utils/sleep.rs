//! Randomized pauses for de-synchronizing node fleets.

use std::sync::Arc;

use petrel_base::Dispatcher;
use rand::Rng;

use crate::basic::Sleep;

/// Sleep a uniformly random number of seconds in `[seconds_min,
/// seconds_max]`.
///
/// The duration is rolled once, when the dispatcher is built, so every
/// platform resolves to the same pre-built variant; different nodes get
/// different durations because each builds its own pipeline instance.
pub fn random_sleep(name: impl Into<String>, seconds_min: u64, seconds_max: u64) -> Dispatcher {
  let name = name.into();
  let seconds = rand::thread_rng().gen_range(seconds_min..=seconds_max);
  Dispatcher::new(name.clone()).universal(Arc::new(Sleep::new(name, seconds)))
}
