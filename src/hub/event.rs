use std::sync::Arc;

use crate::{player::Properties, surface::Input};

/// Ownership change of a playback service on the bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnerChange {
    Added {
        name: Arc<str>,
        owner: Arc<str>,
    },
    Removed {
        name: Arc<str>,
        owner: Arc<str>,
    },
    Renamed {
        name: Arc<str>,
        old_owner: Arc<str>,
        new_owner: Arc<str>,
    },
}

#[derive(Debug)]
pub enum Event {
    Owner(OwnerChange),
    Properties {
        owner: Arc<str>,
        properties: Properties,
    },
    Volume(f64),
    Input(Input),
    Tick,
    /// Leave the run loop, resetting the surface.
    Shutdown,
}

impl From<OwnerChange> for Event {
    fn from(change: OwnerChange) -> Self {
        Self::Owner(change)
    }
}

impl From<Input> for Event {
    fn from(input: Input) -> Self {
        Self::Input(input)
    }
}
