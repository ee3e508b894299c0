use std::sync::Arc;

use super::msg::Displayable;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("MIDI initialization failed")]
    Init(#[from] midir::InitError),

    #[error("Error connecting to MIDI port {}", .0)]
    Connection(Arc<str>),

    #[error("Couldn't retrieve a MIDI port name")]
    PortInfoError(#[from] midir::PortInfoError),

    #[error("No MIDI port found starting with {}", .0)]
    PortNotFound(Arc<str>),

    #[error("Couldn't send MIDI message {}: {}", .msg, .source)]
    Send {
        msg: Displayable<'static>,
        source: midir::SendError,
    },
}
