use crossbeam_channel as channel;
use std::time::{Duration, Instant};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(250);

/// Starts ticking every `interval`.
///
/// Ticks don't pile up: those occurring while the previous one
/// is still pending are dropped.
pub fn start(interval: Duration) -> channel::Receiver<Instant> {
    log::debug!("Ticking every {} ms", interval.as_millis());
    channel::tick(interval)
}
