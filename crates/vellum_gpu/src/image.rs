//! Image resource descriptor (T#).
//!
//! Eight dwords. Only the fields the recompiler and the resource tracker look
//! at are decoded; the remaining bits round-trip as zero.
//!
//! | Dword | Bits | Field |
//! |-------|------|-------|
//! | 0 | 0..32 | `base_address[39:8]` |
//! | 1 | 0..6 | `base_address[45:40]` |
//! | 1 | 8..20 | `min_lod` |
//! | 1 | 20..26 | `data_format` |
//! | 1 | 26..30 | `num_format` |
//! | 2 | 0..14 | `width - 1` |
//! | 2 | 14..28 | `height - 1` |
//! | 3 | 0..12 | `dst_sel_{x,y,z,w}` |
//! | 3 | 12..16 | `base_level` |
//! | 3 | 16..20 | `last_level` |
//! | 3 | 20..25 | `tiling_index` |
//! | 3 | 28..32 | `type` |
//! | 4 | 0..13 | `depth - 1` |
//! | 4 | 13..27 | `pitch - 1` |
//! | 5 | 0..13 | `base_array` |
//! | 5 | 13..26 | `last_array` |
//! | 7 | 0..32 | `meta_address >> 8` |

use crate::bits::{extract, insert};
use crate::comp_mapping::CompMapping;
use crate::number_format::{
    DataFormat, NumberConversion, NumberFormat, map_number_conversion, remap_number_format,
};

/// Resource dimensionality, as encoded by the T# `TYPE` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ImageType {
    Color1D = 8,
    #[default]
    Color2D = 9,
    Color3D = 10,
    Cube = 11,
    Color1DArray = 12,
    Color2DArray = 13,
    Color2DMsaa = 14,
    Color2DMsaaArray = 15,
}

impl ImageType {
    /// Encodings below 8 describe buffers, not images.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            8 => Self::Color1D,
            9 => Self::Color2D,
            10 => Self::Color3D,
            11 => Self::Cube,
            12 => Self::Color1DArray,
            13 => Self::Color2DArray,
            14 => Self::Color2DMsaa,
            15 => Self::Color2DMsaaArray,
            _ => return None,
        })
    }

    #[inline]
    #[must_use]
    pub fn raw(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub fn is_array(self) -> bool {
        matches!(
            self,
            Self::Color1DArray | Self::Color2DArray | Self::Color2DMsaaArray
        )
    }
}

/// Decoded T#.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Image {
    pub base_address: u64,
    pub min_lod: u16,
    pub data_format: DataFormat,
    pub num_format: NumberFormat,
    /// Stored minus one, as in hardware.
    pub width: u16,
    /// Stored minus one, as in hardware.
    pub height: u16,
    pub dst_sel: CompMapping,
    pub base_level: u8,
    pub last_level: u8,
    pub tiling_index: u8,
    pub type_: u8,
    /// Stored minus one, as in hardware.
    pub depth: u16,
    /// Stored minus one, as in hardware.
    pub pitch: u16,
    pub base_array: u16,
    pub last_array: u16,
    pub meta_address: u64,
}

impl Image {
    pub const DWORDS: usize = 8;

    #[must_use]
    pub fn null() -> Self {
        Self::default()
    }

    /// A single-level 2D color image with an identity swizzle.
    #[must_use]
    pub fn new_2d(base_address: u64, width: u32, height: u32) -> Self {
        debug_assert!(width >= 1 && height >= 1);
        Self {
            base_address,
            data_format: DataFormat::Format8_8_8_8,
            num_format: NumberFormat::Unorm,
            width: (width.max(1) - 1) as u16,
            height: (height.max(1) - 1) as u16,
            pitch: (width.max(1) - 1) as u16,
            dst_sel: CompMapping::IDENTITY,
            type_: ImageType::Color2D.raw() as u8,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: ImageType) -> Self {
        self.type_ = ty.raw() as u8;
        self
    }

    #[must_use]
    pub fn with_format(mut self, num_format: NumberFormat, data_format: DataFormat) -> Self {
        self.num_format = num_format;
        self.data_format = data_format;
        self
    }

    #[must_use]
    pub fn with_dst_select(mut self, dst_sel: CompMapping) -> Self {
        self.dst_sel = dst_sel;
        self
    }

    #[must_use]
    pub fn with_array_range(mut self, base_array: u16, last_array: u16) -> Self {
        self.base_array = base_array;
        self.last_array = last_array;
        self
    }

    #[must_use]
    pub fn from_dwords(dw: [u32; Self::DWORDS]) -> Self {
        Self {
            base_address: (u64::from(dw[0]) << 8) | (u64::from(extract(dw[1], 0, 6)) << 40),
            min_lod: extract(dw[1], 8, 12) as u16,
            data_format: DataFormat::from_raw(extract(dw[1], 20, 6)),
            num_format: NumberFormat::from_raw(extract(dw[1], 26, 4)),
            width: extract(dw[2], 0, 14) as u16,
            height: extract(dw[2], 14, 14) as u16,
            dst_sel: CompMapping::from_packed(extract(dw[3], 0, 12)),
            base_level: extract(dw[3], 12, 4) as u8,
            last_level: extract(dw[3], 16, 4) as u8,
            tiling_index: extract(dw[3], 20, 5) as u8,
            type_: extract(dw[3], 28, 4) as u8,
            depth: extract(dw[4], 0, 13) as u16,
            pitch: extract(dw[4], 13, 14) as u16,
            base_array: extract(dw[5], 0, 13) as u16,
            last_array: extract(dw[5], 13, 13) as u16,
            meta_address: u64::from(dw[7]) << 8,
        }
    }

    #[must_use]
    pub fn to_dwords(&self) -> [u32; Self::DWORDS] {
        let mut dw = [0u32; Self::DWORDS];
        dw[0] = (self.base_address >> 8) as u32;
        insert(&mut dw[1], 0, 6, (self.base_address >> 40) as u32);
        insert(&mut dw[1], 8, 12, u32::from(self.min_lod));
        insert(&mut dw[1], 20, 6, self.data_format.raw());
        insert(&mut dw[1], 26, 4, self.num_format.raw());
        insert(&mut dw[2], 0, 14, u32::from(self.width));
        insert(&mut dw[2], 14, 14, u32::from(self.height));
        insert(&mut dw[3], 0, 12, self.dst_sel.packed());
        insert(&mut dw[3], 12, 4, u32::from(self.base_level));
        insert(&mut dw[3], 16, 4, u32::from(self.last_level));
        insert(&mut dw[3], 20, 5, u32::from(self.tiling_index));
        insert(&mut dw[3], 28, 4, u32::from(self.type_));
        insert(&mut dw[4], 0, 13, u32::from(self.depth));
        insert(&mut dw[4], 13, 14, u32::from(self.pitch));
        insert(&mut dw[5], 0, 13, u32::from(self.base_array));
        insert(&mut dw[5], 13, 13, u32::from(self.last_array));
        dw[7] = (self.meta_address >> 8) as u32;
        dw
    }

    /// A T# whose type field does not name an image is unbound.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.image_type().is_some()
    }

    #[inline]
    #[must_use]
    pub fn image_type(&self) -> Option<ImageType> {
        ImageType::from_raw(u32::from(self.type_))
    }

    /// Dimensionality the image is bound with. Array views covering a single
    /// layer bind as their non-array counterpart.
    #[must_use]
    pub fn bound_type(&self) -> ImageType {
        let ty = self.image_type().unwrap_or_default();
        if self.last_array != self.base_array {
            return ty;
        }
        match ty {
            ImageType::Color1DArray => ImageType::Color1D,
            ImageType::Color2DArray => ImageType::Color2D,
            ImageType::Color2DMsaaArray => ImageType::Color2DMsaa,
            other => other,
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        u32::from(self.width) + 1
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        u32::from(self.height) + 1
    }

    #[inline]
    #[must_use]
    pub fn depth(&self) -> u32 {
        u32::from(self.depth) + 1
    }

    #[inline]
    #[must_use]
    pub fn pitch(&self) -> u32 {
        u32::from(self.pitch) + 1
    }

    #[must_use]
    pub fn number_format(&self) -> NumberFormat {
        remap_number_format(self.num_format, self.data_format)
    }

    #[must_use]
    pub fn number_conversion(&self) -> NumberConversion {
        map_number_conversion(self.num_format, self.data_format)
    }

    #[inline]
    #[must_use]
    pub fn dst_select(&self) -> CompMapping {
        self.dst_sel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comp_mapping::CompSwizzle;

    #[test]
    fn test_decode_fields() {
        let swizzle = CompMapping::new(
            CompSwizzle::Blue,
            CompSwizzle::Green,
            CompSwizzle::Red,
            CompSwizzle::One,
        );
        let image = Image::new_2d(0x0012_3456_7800, 1920, 1080)
            .with_format(NumberFormat::Srgb, DataFormat::Format8_8_8_8)
            .with_dst_select(swizzle);
        let decoded = Image::from_dwords(image.to_dwords());

        assert_eq!(decoded, image);
        assert_eq!(decoded.width(), 1920);
        assert_eq!(decoded.height(), 1080);
        assert_eq!(decoded.image_type(), Some(ImageType::Color2D));
        assert_eq!(decoded.dst_select(), swizzle);
        assert_eq!(decoded.number_format(), NumberFormat::Srgb);
    }

    #[test]
    fn test_buffer_type_is_not_an_image() {
        assert!(!Image::null().is_valid());
        let mut image = Image::new_2d(0x1000, 4, 4);
        image.type_ = 2;
        assert!(!image.is_valid());
    }

    #[test]
    fn test_single_layer_array_binds_as_plain() {
        let image = Image::new_2d(0x1000, 4, 4).with_type(ImageType::Color2DArray);
        assert_eq!(image.bound_type(), ImageType::Color2D);

        let layered = image.with_array_range(0, 5);
        assert_eq!(layered.bound_type(), ImageType::Color2DArray);

        let cube = Image::new_2d(0x1000, 4, 4).with_type(ImageType::Cube);
        assert_eq!(cube.bound_type(), ImageType::Cube);
    }
}
