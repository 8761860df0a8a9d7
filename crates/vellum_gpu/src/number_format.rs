//! Number / Data Formats
//!
//! Hardware encodings of the `NUM_FORMAT` and `DATA_FORMAT` descriptor fields,
//! plus the helpers the recompiler uses to classify them:
//!
//! - [`remap_number_format`] folds scaled / "nz" formats onto the format the
//!   shader actually reads, with the difference expressed as a
//!   [`NumberConversion`] applied in shader code.
//! - [`number_class`] groups formats into the float / signed / unsigned families
//!   that decide the type of a shader input.

// ─── Number Format ────────────────────────────────────────────────────────────

/// `NUM_FORMAT` field of buffer and image descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum NumberFormat {
    #[default]
    Unorm = 0,
    Snorm = 1,
    Uscaled = 2,
    Sscaled = 3,
    Uint = 4,
    Sint = 5,
    SnormNz = 6,
    Float = 7,
    Srgb = 9,
    Ubnorm = 10,
    UbnormNz = 11,
    Ubint = 12,
    Ubscaled = 13,
}

impl NumberFormat {
    /// Decodes a raw field value. Reserved encodings read as `Unorm`, which is
    /// what the texture unit does with them.
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Snorm,
            2 => Self::Uscaled,
            3 => Self::Sscaled,
            4 => Self::Uint,
            5 => Self::Sint,
            6 => Self::SnormNz,
            7 => Self::Float,
            9 => Self::Srgb,
            10 => Self::Ubnorm,
            11 => Self::UbnormNz,
            12 => Self::Ubint,
            13 => Self::Ubscaled,
            _ => Self::Unorm,
        }
    }

    #[inline]
    #[must_use]
    pub fn raw(self) -> u32 {
        self as u32
    }
}

// ─── Data Format ──────────────────────────────────────────────────────────────

/// `DATA_FORMAT` field of buffer and image descriptors.
///
/// Buffers only use the low encodings (up to `Format32_32_32_32`); images use
/// the full 6-bit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DataFormat {
    #[default]
    FormatInvalid = 0,
    Format8 = 1,
    Format16 = 2,
    Format8_8 = 3,
    Format32 = 4,
    Format16_16 = 5,
    Format10_11_11 = 6,
    Format11_11_10 = 7,
    Format10_10_10_2 = 8,
    Format2_10_10_10 = 9,
    Format8_8_8_8 = 10,
    Format32_32 = 11,
    Format16_16_16_16 = 12,
    Format32_32_32 = 13,
    Format32_32_32_32 = 14,
    Format5_6_5 = 16,
    Format1_5_5_5 = 17,
    Format5_5_5_1 = 18,
    Format4_4_4_4 = 19,
    Format8_24 = 20,
    Format24_8 = 21,
    FormatX24_8_32 = 22,
    FormatGbGr = 32,
    FormatBgRg = 33,
    Format5_9_9_9 = 34,
    FormatBc1 = 35,
    FormatBc2 = 36,
    FormatBc3 = 37,
    FormatBc4 = 38,
    FormatBc5 = 39,
    FormatBc6 = 40,
    FormatBc7 = 41,
}

impl DataFormat {
    /// Decodes a raw field value. Unknown encodings read as `FormatInvalid`.
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Format8,
            2 => Self::Format16,
            3 => Self::Format8_8,
            4 => Self::Format32,
            5 => Self::Format16_16,
            6 => Self::Format10_11_11,
            7 => Self::Format11_11_10,
            8 => Self::Format10_10_10_2,
            9 => Self::Format2_10_10_10,
            10 => Self::Format8_8_8_8,
            11 => Self::Format32_32,
            12 => Self::Format16_16_16_16,
            13 => Self::Format32_32_32,
            14 => Self::Format32_32_32_32,
            16 => Self::Format5_6_5,
            17 => Self::Format1_5_5_5,
            18 => Self::Format5_5_5_1,
            19 => Self::Format4_4_4_4,
            20 => Self::Format8_24,
            21 => Self::Format24_8,
            22 => Self::FormatX24_8_32,
            32 => Self::FormatGbGr,
            33 => Self::FormatBgRg,
            34 => Self::Format5_9_9_9,
            35 => Self::FormatBc1,
            36 => Self::FormatBc2,
            37 => Self::FormatBc3,
            38 => Self::FormatBc4,
            39 => Self::FormatBc5,
            40 => Self::FormatBc6,
            41 => Self::FormatBc7,
            _ => Self::FormatInvalid,
        }
    }

    #[inline]
    #[must_use]
    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Width in bits of the widest component.
    #[must_use]
    pub fn component_bits(self) -> u32 {
        match self {
            Self::Format8
            | Self::Format8_8
            | Self::Format8_8_8_8
            | Self::FormatGbGr
            | Self::FormatBgRg => 8,
            Self::Format16 | Self::Format16_16 | Self::Format16_16_16_16 => 16,
            Self::Format32
            | Self::Format32_32
            | Self::Format32_32_32
            | Self::Format32_32_32_32
            | Self::FormatX24_8_32 => 32,
            Self::Format10_11_11 | Self::Format11_11_10 => 11,
            Self::Format10_10_10_2 | Self::Format2_10_10_10 => 10,
            Self::Format5_6_5 => 6,
            Self::Format1_5_5_5 | Self::Format5_5_5_1 => 5,
            Self::Format4_4_4_4 => 4,
            Self::Format8_24 | Self::Format24_8 => 24,
            Self::Format5_9_9_9 => 9,
            Self::FormatInvalid
            | Self::FormatBc1
            | Self::FormatBc2
            | Self::FormatBc3
            | Self::FormatBc4
            | Self::FormatBc5
            | Self::FormatBc6
            | Self::FormatBc7 => 0,
        }
    }
}

// ─── Classification ───────────────────────────────────────────────────────────

/// Scalar family a shader sees when reading a formatted resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NumberClass {
    #[default]
    Float,
    Sint,
    Uint,
}

/// Conversion applied in shader code after a read, for formats the host API
/// cannot express directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NumberConversion {
    #[default]
    None,
    UintToUscaled,
    SintToSscaled,
    UnormToUbnorm,
    Sint8ToSnormNz,
    Sint16ToSnormNz,
    Uint32ToUnorm,
}

/// Maps a descriptor's number format to the format the resource is bound with.
#[must_use]
pub fn remap_number_format(num_format: NumberFormat, data_format: DataFormat) -> NumberFormat {
    match num_format {
        NumberFormat::Uscaled | NumberFormat::Ubint | NumberFormat::Ubscaled => NumberFormat::Uint,
        NumberFormat::Sscaled | NumberFormat::SnormNz => NumberFormat::Sint,
        NumberFormat::Ubnorm | NumberFormat::UbnormNz => NumberFormat::Unorm,
        // 32-bit unorm has no host equivalent; read raw bits and normalize in shader.
        NumberFormat::Unorm if data_format.component_bits() == 32 => NumberFormat::Uint,
        other => other,
    }
}

/// Conversion the shader must apply to values read through a remapped format.
#[must_use]
pub fn map_number_conversion(
    num_format: NumberFormat,
    data_format: DataFormat,
) -> NumberConversion {
    match num_format {
        NumberFormat::Uscaled => NumberConversion::UintToUscaled,
        NumberFormat::Sscaled => NumberConversion::SintToSscaled,
        NumberFormat::Ubnorm | NumberFormat::UbnormNz => NumberConversion::UnormToUbnorm,
        NumberFormat::SnormNz => match data_format.component_bits() {
            8 => NumberConversion::Sint8ToSnormNz,
            16 => NumberConversion::Sint16ToSnormNz,
            _ => NumberConversion::None,
        },
        NumberFormat::Unorm if data_format.component_bits() == 32 => {
            NumberConversion::Uint32ToUnorm
        }
        _ => NumberConversion::None,
    }
}

/// Scalar family of an already remapped number format.
#[must_use]
pub fn number_class(num_format: NumberFormat) -> NumberClass {
    match num_format {
        NumberFormat::Sint => NumberClass::Sint,
        NumberFormat::Uint => NumberClass::Uint,
        _ => NumberClass::Float,
    }
}

#[inline]
#[must_use]
pub fn is_integer(num_format: NumberFormat) -> bool {
    matches!(num_format, NumberFormat::Sint | NumberFormat::Uint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_format_raw_roundtrip() {
        for raw in 0..16 {
            let fmt = NumberFormat::from_raw(raw);
            if raw == 8 || raw > 13 {
                assert_eq!(fmt, NumberFormat::Unorm);
            } else {
                assert_eq!(fmt.raw(), raw);
            }
        }
    }

    #[test]
    fn test_scaled_formats_remap_to_integers() {
        let dfmt = DataFormat::Format8_8_8_8;
        assert_eq!(remap_number_format(NumberFormat::Uscaled, dfmt), NumberFormat::Uint);
        assert_eq!(remap_number_format(NumberFormat::Sscaled, dfmt), NumberFormat::Sint);
        assert_eq!(remap_number_format(NumberFormat::Float, dfmt), NumberFormat::Float);

        assert_eq!(
            map_number_conversion(NumberFormat::Uscaled, dfmt),
            NumberConversion::UintToUscaled
        );
        assert_eq!(
            map_number_conversion(NumberFormat::SnormNz, DataFormat::Format16_16),
            NumberConversion::Sint16ToSnormNz
        );
        assert_eq!(
            map_number_conversion(NumberFormat::Float, dfmt),
            NumberConversion::None
        );
    }

    #[test]
    fn test_unorm32_reads_as_uint() {
        let dfmt = DataFormat::Format32_32;
        assert_eq!(remap_number_format(NumberFormat::Unorm, dfmt), NumberFormat::Uint);
        assert_eq!(
            map_number_conversion(NumberFormat::Unorm, dfmt),
            NumberConversion::Uint32ToUnorm
        );
    }

    #[test]
    fn test_number_class() {
        assert_eq!(number_class(NumberFormat::Float), NumberClass::Float);
        assert_eq!(number_class(NumberFormat::Unorm), NumberClass::Float);
        assert_eq!(number_class(NumberFormat::Sint), NumberClass::Sint);
        assert_eq!(number_class(NumberFormat::Uint), NumberClass::Uint);
        assert!(is_integer(NumberFormat::Uint));
        assert!(!is_integer(NumberFormat::Srgb));
    }
}
