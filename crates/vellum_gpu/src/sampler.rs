//! Sampler resource descriptor (S#).

use crate::bits::{extract, insert};

/// Texture coordinate wrap mode (`CLAMP_{X,Y,Z}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ClampMode {
    #[default]
    Wrap = 0,
    Mirror = 1,
    ClampLastTexel = 2,
    MirrorOnceLastTexel = 3,
    ClampHalfBorder = 4,
    MirrorOnceHalfBorder = 5,
    ClampBorder = 6,
    MirrorOnceBorder = 7,
}

impl ClampMode {
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        match raw & 0x7 {
            1 => Self::Mirror,
            2 => Self::ClampLastTexel,
            3 => Self::MirrorOnceLastTexel,
            4 => Self::ClampHalfBorder,
            5 => Self::MirrorOnceHalfBorder,
            6 => Self::ClampBorder,
            7 => Self::MirrorOnceBorder,
            _ => Self::Wrap,
        }
    }
}

/// Decoded S#.
///
/// `min_lod`, `max_lod` and `lod_bias` keep their raw fixed-point encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sampler {
    pub clamp_x: ClampMode,
    pub clamp_y: ClampMode,
    pub clamp_z: ClampMode,
    pub max_aniso_ratio: u8,
    pub depth_compare_func: u8,
    /// Texel coordinates are used as-is instead of being normalized to `[0, 1]`.
    pub force_unnormalized: bool,
    pub force_degamma: bool,
    pub min_lod: u16,
    pub max_lod: u16,
    pub lod_bias: u16,
    pub xy_mag_filter: u8,
    pub xy_min_filter: u8,
    pub z_filter: u8,
    pub mip_filter: u8,
    pub border_color_ptr: u16,
    pub border_color_type: u8,
}

impl Sampler {
    pub const DWORDS: usize = 4;

    #[must_use]
    pub fn from_dwords(dw: [u32; Self::DWORDS]) -> Self {
        Self {
            clamp_x: ClampMode::from_raw(extract(dw[0], 0, 3)),
            clamp_y: ClampMode::from_raw(extract(dw[0], 3, 3)),
            clamp_z: ClampMode::from_raw(extract(dw[0], 6, 3)),
            max_aniso_ratio: extract(dw[0], 9, 3) as u8,
            depth_compare_func: extract(dw[0], 12, 3) as u8,
            force_unnormalized: extract(dw[0], 15, 1) != 0,
            force_degamma: extract(dw[0], 20, 1) != 0,
            min_lod: extract(dw[1], 0, 12) as u16,
            max_lod: extract(dw[1], 12, 12) as u16,
            lod_bias: extract(dw[2], 0, 14) as u16,
            xy_mag_filter: extract(dw[2], 20, 2) as u8,
            xy_min_filter: extract(dw[2], 22, 2) as u8,
            z_filter: extract(dw[2], 24, 2) as u8,
            mip_filter: extract(dw[2], 26, 2) as u8,
            border_color_ptr: extract(dw[3], 0, 12) as u16,
            border_color_type: extract(dw[3], 30, 2) as u8,
        }
    }

    #[must_use]
    pub fn to_dwords(&self) -> [u32; Self::DWORDS] {
        let mut dw = [0u32; Self::DWORDS];
        insert(&mut dw[0], 0, 3, self.clamp_x as u32);
        insert(&mut dw[0], 3, 3, self.clamp_y as u32);
        insert(&mut dw[0], 6, 3, self.clamp_z as u32);
        insert(&mut dw[0], 9, 3, u32::from(self.max_aniso_ratio));
        insert(&mut dw[0], 12, 3, u32::from(self.depth_compare_func));
        insert(&mut dw[0], 15, 1, u32::from(self.force_unnormalized));
        insert(&mut dw[0], 20, 1, u32::from(self.force_degamma));
        insert(&mut dw[1], 0, 12, u32::from(self.min_lod));
        insert(&mut dw[1], 12, 12, u32::from(self.max_lod));
        insert(&mut dw[2], 0, 14, u32::from(self.lod_bias));
        insert(&mut dw[2], 20, 2, u32::from(self.xy_mag_filter));
        insert(&mut dw[2], 22, 2, u32::from(self.xy_min_filter));
        insert(&mut dw[2], 24, 2, u32::from(self.z_filter));
        insert(&mut dw[2], 26, 2, u32::from(self.mip_filter));
        insert(&mut dw[3], 0, 12, u32::from(self.border_color_ptr));
        insert(&mut dw[3], 30, 2, u32::from(self.border_color_type));
        dw
    }

    #[must_use]
    pub fn with_unnormalized(mut self, force_unnormalized: bool) -> Self {
        self.force_unnormalized = force_unnormalized;
        self
    }
}
