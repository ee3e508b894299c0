//! Behringer X-Touch One in standard (non Mackie) mode.

use super::{Button, Control, Input, Led};
use crate::{
    display::{Color, Invert, LcdPayload, SegmentPayload},
    midi::{self, Msg},
};

mod button {
    pub const ENCODER: u8 = 0;
    pub const PREVIOUS: u8 = 20;
    pub const NEXT: u8 = 21;
    pub const STOP: u8 = 22;
    pub const PLAY: u8 = 23;
    pub const CLOCK: u8 = 24;
    pub const BANK_LEFT: u8 = 25;
    pub const BANK_RIGHT: u8 = 26;
    pub const FADER_TOUCHED: u8 = 110;

    pub const FIRST_LED: u8 = 1;
    pub const LAST_LED: u8 = 35;

    pub const ON: u8 = crate::midi::u7::MAX;
    pub const OFF: u8 = 0;
}

mod cc {
    pub const FADER: u8 = 70;
    pub const LED_RING: u8 = 80;
    pub const LED_METER: u8 = 90;

    pub const LED_RING_CENTER: u8 = 64;
}

fn button_from_note(note: u8) -> Option<Button> {
    use button::*;

    let button = match note {
        ENCODER => Button::Encoder,
        PREVIOUS => Button::Previous,
        NEXT => Button::Next,
        STOP => Button::Stop,
        PLAY => Button::Play,
        CLOCK => Button::Clock,
        BANK_LEFT => Button::BankLeft,
        BANK_RIGHT => Button::BankRight,
        FADER_TOUCHED => Button::FaderTouch,
        _ => return None,
    };

    Some(button)
}

fn led_note(led: Led) -> u8 {
    match led {
        Led::Stop => button::STOP,
        Led::Play => button::PLAY,
        Led::Clock => button::CLOCK,
    }
}

/// Decodes a message from the device.
///
/// A note on with a null velocity is a release, as is customary with MIDI.
pub fn decode(msg: &[u8]) -> Option<Input> {
    let (&tag_chan, data) = msg.split_first()?;

    match (midi::Tag::from(tag_chan), data) {
        (midi::NOTE_ON, &[note, velocity, ..]) => {
            let button = button_from_note(note)?;
            if velocity == 0 {
                Some(Input::Released(button))
            } else {
                Some(Input::Pressed { button, velocity })
            }
        }
        (midi::NOTE_OFF, &[note, ..]) => button_from_note(note).map(Input::Released),
        (midi::CONTROL_CHANGE, &[controller, value, ..]) => {
            let control = match controller {
                cc::FADER => Control::Fader,
                cc::LED_RING => Control::Ring,
                _ => return None,
            };

            Some(Input::Control { control, value })
        }
        _ => None,
    }
}

pub struct XTouchOne {
    out: midi::PortOut,
    chan: midi::Channel,
}

impl XTouchOne {
    pub fn new(out: midi::PortOut) -> Self {
        Self {
            out,
            chan: midi::Channel::default(),
        }
    }

    fn send(&mut self, msg: Msg) {
        if let Err(err) = self.out.send(&msg) {
            log::error!("{} {err}", self.out.name());
        }
    }
}

impl super::Output for XTouchOne {
    fn reset(&mut self) {
        use button::*;

        for note in FIRST_LED..=LAST_LED {
            self.send(Msg::note_on(self.chan, note, OFF));
        }

        self.send(Msg::control_change(self.chan, cc::FADER, 0));
        self.send(Msg::control_change(
            self.chan,
            cc::LED_RING,
            cc::LED_RING_CENTER,
        ));
        self.send(Msg::control_change(self.chan, cc::LED_METER, 0));

        self.send_segments(&SegmentPayload::blank());
        self.send_lcd(&LcdPayload::new("", Color::Black, Invert::empty()));
    }

    fn set_led(&mut self, led: Led, on: bool) {
        let value = if on { button::ON } else { button::OFF };
        self.send(Msg::note_on(self.chan, led_note(led), value));
    }

    fn set_fader(&mut self, value: u8) {
        self.send(Msg::control_change(self.chan, cc::FADER, value));
    }

    fn set_ring(&mut self, value: u8) {
        self.send(Msg::control_change(self.chan, cc::LED_RING, value));
    }

    fn send_lcd(&mut self, payload: &LcdPayload) {
        self.send(Msg::new_sysex(payload.as_bytes()));
    }

    fn send_segments(&mut self, payload: &SegmentPayload) {
        self.send(Msg::new_sysex(payload.as_bytes()));
    }
}
