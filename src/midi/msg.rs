use std::{borrow::Cow, fmt};

use super::{sysex, Channel, CONTROL_CHANGE, NOTE_ON};

/// Hex view of a MIDI buffer, for logs and error reports.
#[derive(Debug)]
pub struct Displayable<'a>(Cow<'a, [u8]>);

impl<'a> From<&'a [u8]> for Displayable<'a> {
    fn from(buf: &'a [u8]) -> Self {
        Self(Cow::Borrowed(buf))
    }
}

impl<'a> Displayable<'a> {
    pub fn to_owned(&self) -> Displayable<'static> {
        Displayable(Cow::Owned(self.0.to_vec()))
    }
}

impl<'a> fmt::Display for Displayable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();

        match iter.next() {
            Some(first) => write!(f, "(hex): {first:02x}")?,
            None => return Ok(()),
        };

        for val in iter {
            write!(f, " {val:02x}")?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Msg(Box<[u8]>);

impl Msg {
    pub fn note_on(chan: Channel, note: u8, velocity: u8) -> Self {
        Self::from([NOTE_ON | chan, note, velocity])
    }

    pub fn control_change(chan: Channel, controller: u8, value: u8) -> Self {
        Self::from([CONTROL_CHANGE | chan, controller, value])
    }

    pub fn new_sysex(data: &[u8]) -> Self {
        let mut buf = Vec::with_capacity(data.len() + 2);

        buf.push(sysex::TAG);
        buf.extend(data);
        buf.push(sysex::END_TAG);

        Self(buf.into())
    }

    pub fn inner(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn display(&self) -> Displayable<'_> {
        Displayable::from(self.0.as_ref())
    }
}

impl<const S: usize> From<[u8; S]> for Msg {
    fn from(buf: [u8; S]) -> Self {
        Self(buf.into())
    }
}

impl From<&[u8]> for Msg {
    fn from(buf: &[u8]) -> Self {
        Self(buf.into())
    }
}

impl std::ops::Deref for Msg {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
