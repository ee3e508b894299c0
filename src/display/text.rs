use std::borrow::Cow;

/// Reduces `text` to printable ASCII.
///
/// Non-ASCII characters are replaced with their closest ASCII rendition,
/// control characters with a space.
pub fn transliterate(text: &str) -> Cow<'_, str> {
    let is_printable = |c: char| c == ' ' || c.is_ascii_graphic();

    if text.chars().all(is_printable) {
        return Cow::Borrowed(text);
    }

    let ascii = deunicode::deunicode(text);
    Cow::Owned(
        ascii
            .chars()
            .map(|c| if is_printable(c) { c } else { ' ' })
            .collect(),
    )
}

/// Returns exactly `width` chars of `text` starting at `offset`, padded with spaces.
pub fn pad_right(text: &str, width: usize, offset: usize) -> String {
    let text = transliterate(text);
    if offset >= text.len() {
        return " ".repeat(width);
    }

    let end = text.len().min(offset + width);
    let mut res = String::with_capacity(width);
    res.push_str(&text[offset..end]);
    res.extend(std::iter::repeat(' ').take(width - (end - offset)));

    res
}

/// Right-aligns `text` in `width` chars, keeping the first `width` chars if too long.
pub fn pad_left(text: &str, width: usize) -> String {
    let text = transliterate(text);
    if text.len() > width {
        return text[..width].to_string();
    }

    format!("{text:>width$}")
}
