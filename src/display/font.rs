//! 7-segment font.
//!
//! Bit 0 is segment `a` (top), going clockwise to bit 5 (`f`, top left),
//! bit 6 is the middle segment `g`.

/// Characters rendered with their decimal point lit to tell them apart
/// from lookalikes (`Q`/`O`, `R`/`A`, `U`/`V`).
pub const DOTTED: &[u8] = b"QRUu";

pub const fn mask(c: u8) -> u8 {
    match c {
        b'0' => 0b0111111,
        b'1' => 0b0000110,
        b'2' => 0b1011011,
        b'3' => 0b1001111,
        b'4' => 0b1100110,
        b'5' => 0b1101101,
        b'6' => 0b1111101,
        b'7' => 0b0100111,
        b'8' => 0b1111111,
        b'9' => 0b1101111,
        b'A' => 0b1110111,
        b'B' => 0b1111111,
        b'C' => 0b0111001,
        b'D' => 0b0111111,
        b'E' => 0b1111001,
        b'F' => 0b1110001,
        b'G' => 0b0111101,
        b'H' => 0b1110110,
        b'I' => 0b0110000,
        b'J' => 0b0001110,
        b'K' => 0b1110101,
        b'L' => 0b0111000,
        b'M' => 0b0010101,
        b'N' => 0b0110111,
        b'O' => 0b0111111,
        b'P' => 0b1110011,
        b'Q' => 0b0111111,
        b'R' => 0b1110111,
        b'S' => 0b1101101,
        b'T' => 0b1111000,
        b'U' => 0b0111110,
        b'V' => 0b0111110,
        b'W' => 0b0101010,
        b'X' => 0b1001001,
        b'Y' => 0b1101110,
        b'Z' => 0b1011011,
        b'a' => 0b1011111,
        b'b' => 0b1111100,
        b'c' => 0b1011000,
        b'd' => 0b1011110,
        b'e' => 0b1111011,
        b'f' => 0b1110001,
        b'g' => 0b1101111,
        b'h' => 0b1110100,
        b'i' => 0b0010000,
        b'j' => 0b0001100,
        b'k' => 0b1110101,
        b'l' => 0b0110000,
        b'm' => 0b0010100,
        b'n' => 0b1010100,
        b'o' => 0b1011100,
        b'p' => 0b1110011,
        b'q' => 0b1100111,
        b'r' => 0b1010000,
        b's' => 0b1101101,
        b't' => 0b1111000,
        b'u' => 0b0011100,
        b'v' => 0b0011100,
        b'w' => 0b0010100,
        b'x' => 0b1001000,
        b'y' => 0b1101110,
        b'z' => 0b1011011,
        b':' => 0b0001001,
        b'-' => 0b1000000,
        b')' => 0b0001111,
        b'(' => 0b0111001,
        b'.' => 0b0001000,
        b'"' => 0b0100010,
        b'_' => 0b0001000,
        b'\'' => 0b0100000,
        _ => 0,
    }
}

pub fn render<const N: usize>(cells: &[u8; N]) -> [u8; N] {
    let mut masks = [0u8; N];
    for (mask_, &c) in masks.iter_mut().zip(cells) {
        *mask_ = mask(c);
    }

    masks
}

/// Packs the decimal points: cell `i` is bit `i % 7` of byte `i / 7`.
pub fn dots(cells: &[u8]) -> [u8; 2] {
    let mut dots = [0u8; 2];
    for (idx, c) in cells.iter().enumerate().take(14) {
        if DOTTED.contains(c) {
            dots[idx / 7] |= 1 << (idx % 7);
        }
    }

    dots
}
