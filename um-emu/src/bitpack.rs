//! Reading and writing bit fields of a 64-bit word.
//!
//! A field is described by its `width` and the position of its least significant bit, `lsb`,
//! where bit 0 is the least significant bit of the word. Every field must lie inside the word:
//! `width + lsb <= 64`. Asking for a field outside the word is a bug in the caller and panics.
//!
//! Rust's `<<` and `>>` are not defined for shift amounts of 64 or more, which the mask
//! arithmetic below needs (a zero-width field shifts by exactly 64). The shift helpers in this
//! module define those cases explicitly: a logical shift by 64 or more yields 0 and an
//! arithmetic right shift yields the sign fill.

use crate::error::BitpackError;

const WORD_BITS: u32 = u64::BITS;

fn shift_left(word: u64, offset: u32) -> u64 {
    if offset < WORD_BITS {
        word << offset
    } else {
        0
    }
}

fn shift_right_logical(word: u64, offset: u32) -> u64 {
    if offset < WORD_BITS {
        word >> offset
    } else {
        0
    }
}

fn shift_right_arith(word: i64, offset: u32) -> i64 {
    if offset < WORD_BITS {
        word >> offset
    } else if word < 0 {
        -1
    } else {
        0
    }
}

fn check_field(width: u32, lsb: u32) {
    assert!(width <= WORD_BITS, "field width {width} exceeds {WORD_BITS} bits");
    assert!(
        width + lsb <= WORD_BITS,
        "field of width {width} at bit {lsb} does not fit in {WORD_BITS} bits"
    );
}

/// Ones in bits `[lsb, lsb + width)`, zeros elsewhere
fn field_mask(width: u32, lsb: u32) -> u64 {
    let top_ones = shift_left(!0, WORD_BITS - width);
    shift_right_logical(top_ones, WORD_BITS - width - lsb)
}

fn replace(word: u64, width: u32, lsb: u32, bits: u64) -> u64 {
    let mask = field_mask(width, lsb);
    (word & !mask) | (shift_left(bits, lsb) & mask)
}

/// Returns true iff `value` is representable as a `width`-bit unsigned integer.
pub fn fits_unsigned(value: u64, width: u32) -> bool {
    assert!(width <= WORD_BITS, "field width {width} exceeds {WORD_BITS} bits");
    value <= !shift_left(!0, width)
}

/// Returns true iff `value` is representable as a `width`-bit two's complement integer. Width 0
/// admits only 0.
pub fn fits_signed(value: i64, width: u32) -> bool {
    assert!(width <= WORD_BITS, "field width {width} exceeds {WORD_BITS} bits");
    if width == 0 {
        return value == 0;
    }

    let min = shift_left(!0, width - 1) as i64;
    let max = !min;
    min <= value && value <= max
}

/// Extracts the unsigned field of `width` bits starting at bit `lsb`.
pub fn get_unsigned(word: u64, width: u32, lsb: u32) -> u64 {
    check_field(width, lsb);
    shift_right_logical(word & field_mask(width, lsb), lsb)
}

/// Extracts the field of `width` bits starting at bit `lsb` and sign-extends it.
pub fn get_signed(word: u64, width: u32, lsb: u32) -> i64 {
    check_field(width, lsb);

    // Move the field to the top of the word, then shift it back down arithmetically so its top
    // bit is copied into everything above it
    let at_top = shift_left(word & field_mask(width, lsb), WORD_BITS - width - lsb);
    shift_right_arith(at_top as i64, WORD_BITS - width)
}

/// Returns `word` with the field of `width` bits at `lsb` replaced by `value`.
pub fn set_unsigned(word: u64, width: u32, lsb: u32, value: u64) -> Result<u64, BitpackError> {
    check_field(width, lsb);
    if !fits_unsigned(value, width) {
        return Err(BitpackError::Overflow {
            value: value.into(),
            width,
        });
    }

    Ok(replace(word, width, lsb, value))
}

/// Returns `word` with the field of `width` bits at `lsb` replaced by the two's complement
/// encoding of `value`.
pub fn set_signed(word: u64, width: u32, lsb: u32, value: i64) -> Result<u64, BitpackError> {
    check_field(width, lsb);
    if !fits_signed(value, width) {
        return Err(BitpackError::Overflow {
            value: value.into(),
            width,
        });
    }

    Ok(replace(word, width, lsb, value as u64))
}
