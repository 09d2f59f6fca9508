//! Text normalization for knowledge-base keys.
//!
//! Every lookup goes through [`normalize`]: lower-case, transliterated to
//! ASCII, anything outside `[a-z0-9 ]` dropped, whitespace collapsed and
//! trimmed.

use deunicode::deunicode_char;

/// Canonical matching key for arbitrary input.
///
/// Letters and digits are transliterated (`á`->`a`, `ñ`->`n`, `º`->`o`,
/// `ß`->`ss`, `²`->`2`); symbols and emoji are dropped rather than spelled out.
/// Non-string values (numeric cells, ids) are accepted through `Display`.
/// Total and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: impl std::fmt::Display) -> String {
    let lowered = text.to_string().to_lowercase();

    let mut ascii = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if c.is_whitespace() {
            ascii.push(' ');
        } else if c.is_alphanumeric() {
            ascii.push_str(deunicode_char(c).unwrap_or(""));
        }
    }

    // Upper-case output of the transliteration is dropped, not folded
    let kept: String = ascii
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
