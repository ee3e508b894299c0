mod error;
pub use error::Error;

pub mod msg;
pub use msg::Msg;

pub mod port;
pub use port::{PortIn, PortOut};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tag(u8);

impl Tag {
    pub const fn from(byte: u8) -> Self {
        Self(byte & 0xf0)
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 {
        tag.0
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Channel(u8);

impl Channel {
    pub const fn from(byte: u8) -> Self {
        Self(byte & 0x0f)
    }
}

impl From<Channel> for u8 {
    fn from(chan: Channel) -> u8 {
        chan.0
    }
}

impl std::ops::BitOr<Channel> for Tag {
    type Output = u8;

    fn bitor(self, chan: Channel) -> Self::Output {
        self.0 | chan.0
    }
}

pub const NOTE_OFF: Tag = Tag::from(0x80);
pub const NOTE_ON: Tag = Tag::from(0x90);
pub const CONTROL_CHANGE: Tag = Tag::from(0xb0);

pub mod sysex {
    pub const TAG: u8 = 0xf0;
    pub const END_TAG: u8 = 0xf7;
}

/// Data bytes are 7 bits wide.
pub mod u7 {
    pub const MAX: u8 = 0x7f;

    #[inline]
    pub fn from_normalized(val: f64) -> u8 {
        (val.clamp(0f64, 1f64) * MAX as f64) as u8
    }

    #[inline]
    pub fn to_normalized(val: u8) -> f64 {
        val.min(MAX) as f64 / MAX as f64
    }
}
