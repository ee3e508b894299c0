//! Control surface: decoded input and device feedback.

pub mod event;
pub use event::{Button, Control, Input, Led};

pub mod xtouch_one;
pub use xtouch_one::XTouchOne;

use crate::display::{LcdPayload, SegmentPayload};

/// Device feedback.
///
/// Implementations report their own transmission failures:
/// there is nothing the caller could do about them.
pub trait Output {
    /// Switches off every LED, parks the fader and blanks the displays.
    fn reset(&mut self);

    fn set_led(&mut self, led: Led, on: bool);
    fn set_fader(&mut self, value: u8);
    fn set_ring(&mut self, value: u8);

    fn send_lcd(&mut self, payload: &LcdPayload);
    fn send_segments(&mut self, payload: &SegmentPayload);
}
