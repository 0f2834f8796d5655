//! Physical layouts of a decimal value.
//!
//! A mode combines two independent properties: the order of the digit bytes
//! and the encoding of each byte. [`convert`] changes each property on its
//! own, so a reversal never alters an encoding and re-encoding never moves a
//! byte.

/// Order of digit bytes in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitOrder {
    /// Byte `i` holds the digit of weight 10^i.
    LeastSignificantFirst,
    /// Byte `i` holds the digit of weight 10^(len-1-i).
    MostSignificantFirst,
}

/// Encoding of a single digit byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitEncoding {
    /// The digit's value, 0 through 9.
    Raw,
    /// The digit's ASCII character, `b'0'` through `b'9'`.
    Ascii,
}

impl DigitEncoding {
    /// Encode a digit value (0..=9) as a byte.
    #[must_use]
    pub const fn encode(self, value: u8) -> u8 {
        match self {
            Self::Raw => value,
            Self::Ascii => value + b'0',
        }
    }

    /// Decode a byte back into its digit value.
    #[must_use]
    pub const fn decode(self, byte: u8) -> u8 {
        match self {
            Self::Raw => byte,
            Self::Ascii => byte - b'0',
        }
    }
}

/// Representation mode of a decimal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Raw digit values, least-significant first. Arithmetic works here.
    Calculatable,
    /// ASCII characters, most-significant first. A readable string.
    Outputable,
}

impl Mode {
    /// Byte order used by this mode.
    #[must_use]
    pub const fn order(self) -> DigitOrder {
        match self {
            Self::Calculatable => DigitOrder::LeastSignificantFirst,
            Self::Outputable => DigitOrder::MostSignificantFirst,
        }
    }

    /// Digit encoding used by this mode.
    #[must_use]
    pub const fn encoding(self) -> DigitEncoding {
        match self {
            Self::Calculatable => DigitEncoding::Raw,
            Self::Outputable => DigitEncoding::Ascii,
        }
    }

    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Calculatable => Self::Outputable,
            Self::Outputable => Self::Calculatable,
        }
    }
}

/// Rewrite `digits` from the layout of `from` into the layout of `to`, in place.
pub fn convert(digits: &mut [u8], from: Mode, to: Mode) {
    let (source, target) = (from.encoding(), to.encoding());
    if source != target {
        for byte in digits.iter_mut() {
            *byte = target.encode(source.decode(*byte));
        }
    }
    if from.order() != to.order() {
        digits.reverse();
    }
}
