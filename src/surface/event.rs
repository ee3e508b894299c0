#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Encoder,
    Previous,
    Next,
    Stop,
    Play,
    Clock,
    BankLeft,
    BankRight,
    FaderTouch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Fader,
    Ring,
}

/// Decoded surface input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Pressed { button: Button, velocity: u8 },
    Released(Button),
    Control { control: Control, value: u8 },
}

impl Input {
    pub fn pressed(button: Button) -> Self {
        Self::Pressed {
            button,
            velocity: crate::midi::u7::MAX,
        }
    }
}

/// LEDs driven by the hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Led {
    Stop,
    Play,
    Clock,
}
