//! ASCII byte classifiers (component A). Kept deliberately narrow: Turtle's
//! grammar only needs to distinguish a handful of ASCII ranges itself, and
//! defers everything above `0x7F` to [`crate::escape`]'s UTF-8 pass-through.

#[inline]
pub fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

#[inline]
pub fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

#[inline]
pub fn is_hex(c: u8) -> bool {
    in_range(c, b'0', b'9') || in_range(c, b'A', b'F')
}

#[inline]
pub fn in_range(c: u8, lo: u8, hi: u8) -> bool {
    c >= lo && c <= hi
}
