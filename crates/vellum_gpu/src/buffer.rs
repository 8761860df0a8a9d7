//! Buffer resource descriptor (V#).
//!
//! Four dwords, laid out as:
//!
//! | Dword | Bits | Field |
//! |-------|------|-------|
//! | 0 | 0..32 | `base_address[31:0]` |
//! | 1 | 0..12 | `base_address[43:32]` |
//! | 1 | 16..30 | `stride` |
//! | 1 | 30, 31 | `cache_swizzle`, `swizzle_enable` |
//! | 2 | 0..32 | `num_records` |
//! | 3 | 0..12 | `dst_sel_{x,y,z,w}` |
//! | 3 | 12..15 | `num_format` |
//! | 3 | 15..19 | `data_format` |
//! | 3 | 23 | `add_tid_enable` |

use crate::bits::{extract, insert};
use crate::comp_mapping::CompMapping;
use crate::number_format::{
    DataFormat, NumberConversion, NumberFormat, map_number_conversion, remap_number_format,
};

/// Largest stride representable by the 14-bit `STRIDE` field.
pub const MAX_BUFFER_STRIDE: u16 = (1 << 14) - 1;

/// Decoded V#.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Buffer {
    pub base_address: u64,
    pub stride: u16,
    pub cache_swizzle: bool,
    pub swizzle_enable: bool,
    pub num_records: u32,
    pub dst_sel: CompMapping,
    pub num_format: NumberFormat,
    pub data_format: DataFormat,
    pub add_tid_enable: bool,
}

impl Buffer {
    pub const DWORDS: usize = 4;

    /// An unbound (null) descriptor.
    #[must_use]
    pub fn null() -> Self {
        Self::default()
    }

    /// A plain linear buffer. Mostly useful for building user data by hand.
    #[must_use]
    pub fn new(base_address: u64, stride: u16, num_records: u32) -> Self {
        debug_assert!(stride <= MAX_BUFFER_STRIDE);
        Self {
            base_address,
            stride: stride & MAX_BUFFER_STRIDE,
            num_records,
            dst_sel: CompMapping::IDENTITY,
            num_format: NumberFormat::Float,
            data_format: DataFormat::Format32,
            ..Self::default()
        }
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
    pub fn from_dwords(dw: [u32; Self::DWORDS]) -> Self {
        Self {
            base_address: u64::from(dw[0]) | (u64::from(extract(dw[1], 0, 12)) << 32),
            stride: extract(dw[1], 16, 14) as u16,
            cache_swizzle: extract(dw[1], 30, 1) != 0,
            swizzle_enable: extract(dw[1], 31, 1) != 0,
            num_records: dw[2],
            dst_sel: CompMapping::from_packed(extract(dw[3], 0, 12)),
            num_format: NumberFormat::from_raw(extract(dw[3], 12, 3)),
            data_format: DataFormat::from_raw(extract(dw[3], 15, 4)),
            add_tid_enable: extract(dw[3], 23, 1) != 0,
        }
    }

    #[must_use]
    pub fn to_dwords(&self) -> [u32; Self::DWORDS] {
        let mut dw = [0u32; Self::DWORDS];
        dw[0] = self.base_address as u32;
        insert(&mut dw[1], 0, 12, (self.base_address >> 32) as u32);
        insert(&mut dw[1], 16, 14, u32::from(self.stride));
        insert(&mut dw[1], 30, 1, u32::from(self.cache_swizzle));
        insert(&mut dw[1], 31, 1, u32::from(self.swizzle_enable));
        dw[2] = self.num_records;
        insert(&mut dw[3], 0, 12, self.dst_sel.packed());
        insert(&mut dw[3], 12, 3, self.num_format.raw());
        insert(&mut dw[3], 15, 4, self.data_format.raw());
        insert(&mut dw[3], 23, 1, u32::from(self.add_tid_enable));
        dw
    }

    /// A V# with a null base address is unbound.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.base_address != 0
    }

    #[inline]
    #[must_use]
    pub fn stride(&self) -> u16 {
        self.stride
    }

    /// Addressable size in bytes. With a zero stride `num_records` counts bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        if self.stride == 0 {
            u64::from(self.num_records)
        } else {
            u64::from(self.num_records) * u64::from(self.stride)
        }
    }

    /// Number format the buffer is bound with.
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
