//! Destination component selection (`DST_SEL_*` descriptor fields).

/// Source of one destination component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CompSwizzle {
    #[default]
    Zero = 0,
    One = 1,
    Red = 4,
    Green = 5,
    Blue = 6,
    Alpha = 7,
}

impl CompSwizzle {
    /// Decodes a 3-bit `DST_SEL` value. The reserved encodings 2 and 3 select zero.
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        match raw & 0x7 {
            1 => Self::One,
            4 => Self::Red,
            5 => Self::Green,
            6 => Self::Blue,
            7 => Self::Alpha,
            _ => Self::Zero,
        }
    }

    #[inline]
    #[must_use]
    pub fn raw(self) -> u32 {
        self as u32
    }
}

/// Full `RGBA` destination mapping of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompMapping {
    pub r: CompSwizzle,
    pub g: CompSwizzle,
    pub b: CompSwizzle,
    pub a: CompSwizzle,
}

impl CompMapping {
    /// `RGBA → RGBA`.
    pub const IDENTITY: Self = Self {
        r: CompSwizzle::Red,
        g: CompSwizzle::Green,
        b: CompSwizzle::Blue,
        a: CompSwizzle::Alpha,
    };

    #[must_use]
    pub const fn new(r: CompSwizzle, g: CompSwizzle, b: CompSwizzle, a: CompSwizzle) -> Self {
        Self { r, g, b, a }
    }

    /// Decodes four consecutive 3-bit selects starting at bit 0 of `bits`.
    #[must_use]
    pub fn from_packed(bits: u32) -> Self {
        Self {
            r: CompSwizzle::from_raw(bits),
            g: CompSwizzle::from_raw(bits >> 3),
            b: CompSwizzle::from_raw(bits >> 6),
            a: CompSwizzle::from_raw(bits >> 9),
        }
    }

    /// Inverse of [`CompMapping::from_packed`]; occupies the low 12 bits.
    #[must_use]
    pub fn packed(self) -> u32 {
        self.r.raw() | (self.g.raw() << 3) | (self.b.raw() << 6) | (self.a.raw() << 9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_packing() {
        let packed = CompMapping::IDENTITY.packed();
        assert_eq!(packed, 4 | (5 << 3) | (6 << 6) | (7 << 9));
        assert_eq!(CompMapping::from_packed(packed), CompMapping::IDENTITY);
    }

    #[test]
    fn test_reserved_selects_read_as_zero() {
        assert_eq!(CompSwizzle::from_raw(2), CompSwizzle::Zero);
        assert_eq!(CompSwizzle::from_raw(3), CompSwizzle::Zero);
    }
}
