use super::{font, text};

pub const HEADER: [u8; 5] = [0x00, 0x20, 0x32, 0x41, 0x37];
pub const CELLS: usize = 12;
pub const LEN: usize = HEADER.len() + CELLS + 2;

/// Single dot after the hours digits: `   HH.MMSS`.
pub const CLOCK_DOTS: [u8; 2] = [1 << 4, 0];

/// Sysex body for the 12 cells 7-segment display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentPayload([u8; LEN]);

impl SegmentPayload {
    /// Renders `text` with dots computed from the dotted characters.
    pub fn new(text: &str) -> Self {
        let cells = Self::cells(text);
        Self::build(&cells, font::dots(&cells))
    }

    /// Renders `text` with the fixed clock dots.
    pub fn clock(text: &str) -> Self {
        Self::build(&Self::cells(text), CLOCK_DOTS)
    }

    pub fn blank() -> Self {
        Self::new("")
    }

    fn cells(text: &str) -> [u8; CELLS] {
        let mut cells = [0u8; CELLS];
        for (dst, src) in cells.iter_mut().zip(text::transliterate(text).bytes()) {
            *dst = src;
        }

        cells
    }

    fn build(cells: &[u8; CELLS], dots: [u8; 2]) -> Self {
        let mut buf = [0u8; LEN];
        buf[..HEADER.len()].copy_from_slice(&HEADER);
        buf[HEADER.len()..HEADER.len() + CELLS].copy_from_slice(&font::render(cells));
        buf[HEADER.len() + CELLS..].copy_from_slice(&dots);

        Self(buf)
    }

    pub fn masks(&self) -> &[u8] {
        &self.0[HEADER.len()..HEADER.len() + CELLS]
    }

    pub fn dots(&self) -> [u8; 2] {
        [self.0[LEN - 2], self.0[LEN - 1]]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
