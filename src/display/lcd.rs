use super::text;

pub const HEADER: [u8; 6] = [0x00, 0x20, 0x32, 0x41, 0x4c, 0x00];
pub const TEXT_LEN: usize = 14;
pub const HALF_LEN: usize = TEXT_LEN / 2;
pub const LEN: usize = HEADER.len() + 1 + TEXT_LEN;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    #[default]
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

bitflags::bitflags! {
    /// Rows displayed in inverted video.
    pub struct Invert: u8 {
        const TOP = 0b01;
        const BOTTOM = 0b10;
        const BOTH = Self::TOP.bits | Self::BOTTOM.bits;
    }
}

pub fn color_code(color: Color, invert: Invert) -> u8 {
    color as u8 | (invert.bits() << 4)
}

/// Sysex body for the 2x7 chars colored LCD.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LcdPayload([u8; LEN]);

impl LcdPayload {
    pub fn new(text: &str, color: Color, invert: Invert) -> Self {
        let mut buf = [0u8; LEN];
        buf[..HEADER.len()].copy_from_slice(&HEADER);
        buf[HEADER.len()] = color_code(color, invert);

        let text = text::transliterate(text);
        for (dst, src) in buf[HEADER.len() + 1..].iter_mut().zip(text.bytes()) {
            *dst = src;
        }

        Self(buf)
    }

    pub fn blank() -> Self {
        Self::new("", Color::Black, Invert::empty())
    }

    pub fn color_code(&self) -> u8 {
        self.0[HEADER.len()]
    }

    pub fn text(&self) -> &[u8] {
        &self.0[HEADER.len() + 1..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_codes() {
        assert_eq!(color_code(Color::Black, Invert::empty()), 0x00);
        assert_eq!(color_code(Color::Green, Invert::TOP), 0x12);
        assert_eq!(color_code(Color::White, Invert::BOTTOM), 0x27);
        assert_eq!(color_code(Color::Cyan, Invert::BOTH), 0x36);
    }

    #[test]
    fn payload_layout() {
        let payload = LcdPayload::new("A      B      ", Color::Green, Invert::TOP);
        let bytes = payload.as_bytes();

        assert_eq!(bytes.len(), 21);
        assert_eq!(&bytes[..7], &[0x00, 0x20, 0x32, 0x41, 0x4c, 0x00, 0x12]);
        assert_eq!(payload.text(), b"A      B      ");
    }

    #[test]
    fn short_long_and_foreign_text() {
        let short = LcdPayload::new("Hi", Color::Red, Invert::empty());
        assert_eq!(short.text(), b"Hi\0\0\0\0\0\0\0\0\0\0\0\0");

        let long = LcdPayload::new("This is way too long", Color::Red, Invert::empty());
        assert_eq!(long.text(), b"This is way to");

        let foreign = LcdPayload::new("Émilie", Color::Red, Invert::empty());
        assert_eq!(&foreign.text()[..6], b"Emilie");
    }

    #[test]
    fn blank_payload() {
        let blank = LcdPayload::blank();
        assert_eq!(blank.color_code(), 0);
        assert!(blank.text().iter().all(|&b| b == 0));
    }
}
