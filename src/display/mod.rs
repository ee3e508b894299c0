//! Encoding of the surface displays.
//!
//! Everything here is pure: text in, sysex body out. Untranslatable or
//! oversized text degrades to blanks and truncation, never to an error.

pub mod font;

pub mod lcd;
pub use lcd::{Color, Invert, LcdPayload};

pub mod segment;
pub use segment::SegmentPayload;

pub mod text;
pub use text::{pad_left, pad_right, transliterate};
