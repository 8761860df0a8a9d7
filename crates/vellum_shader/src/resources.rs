//! Resource Descriptors
//!
//! Static description of each resource a shader declares, as discovered while
//! translating it. A descriptor knows *where* its sharp lives (a user-data
//! dword index) and how the shader uses the resource; the sharp itself is
//! resolved per dispatch from a [`UserData`] snapshot via [`ResolveSharp`].

use bitflags::bitflags;
use vellum_gpu::{Buffer, Image, Sampler};

use crate::user_data::UserData;

bitflags! {
    /// How a shader accesses a buffer or image.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResourceUsage: u8 {
        /// The shader stores to the resource.
        const WRITTEN   = 1 << 0;
        /// The shader performs atomics on the resource.
        const ATOMIC    = 1 << 1;
        /// Loads go through the descriptor's data / number format.
        const FORMATTED = 1 << 2;
        /// Image is sampled as a depth texture.
        const DEPTH     = 1 << 3;
        /// Image is declared with an array dimension.
        const ARRAY     = 1 << 4;
    }
}

/// Resolution of an abstract descriptor to its hardware record.
pub trait ResolveSharp {
    type Sharp;

    /// Reads the sharp from `ud`. `None` when it is out of range or not a
    /// valid record, i.e. the slot is unbound for this dispatch.
    fn get_sharp(&self, ud: &UserData) -> Option<Self::Sharp>;
}

fn read_buffer(ud: &UserData, sharp_idx: u32) -> Option<Buffer> {
    let buffer = Buffer::from_dwords(ud.read_dwords::<{ Buffer::DWORDS }>(sharp_idx as usize)?);
    buffer.is_valid().then_some(buffer)
}

fn read_image(ud: &UserData, sharp_idx: u32) -> Option<Image> {
    let image = Image::from_dwords(ud.read_dwords::<{ Image::DWORDS }>(sharp_idx as usize)?);
    image.is_valid().then_some(image)
}

// ─── Buffers ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferResource {
    pub sharp_idx: u32,
    pub usage: ResourceUsage,
}

impl BufferResource {
    #[must_use]
    pub fn new(sharp_idx: u32) -> Self {
        Self {
            sharp_idx,
            usage: ResourceUsage::empty(),
        }
    }

    #[must_use]
    pub fn with_usage(mut self, usage: ResourceUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Whether the buffer must be bound for read-write (storage) access.
    ///
    /// Written buffers always are; read-only buffers are too once they
    /// outgrow what the host can bind as a uniform buffer.
    #[must_use]
    pub fn is_storage(&self, sharp: &Buffer, max_ubo_size: u64) -> bool {
        self.usage.intersects(ResourceUsage::WRITTEN | ResourceUsage::ATOMIC)
            || sharp.size() > max_ubo_size
    }
}

impl ResolveSharp for BufferResource {
    type Sharp = Buffer;

    fn get_sharp(&self, ud: &UserData) -> Option<Buffer> {
        read_buffer(ud, self.sharp_idx)
    }
}

// ─── Texture Buffers ──────────────────────────────────────────────────────────

/// Formatted buffer accessed through texel loads / stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureBufferResource {
    pub sharp_idx: u32,
    pub is_written: bool,
}

impl TextureBufferResource {
    #[must_use]
    pub fn new(sharp_idx: u32) -> Self {
        Self {
            sharp_idx,
            is_written: false,
        }
    }
}

impl ResolveSharp for TextureBufferResource {
    type Sharp = Buffer;

    fn get_sharp(&self, ud: &UserData) -> Option<Buffer> {
        read_buffer(ud, self.sharp_idx)
    }
}

// ─── Images ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageResource {
    pub sharp_idx: u32,
    pub usage: ResourceUsage,
}

impl ImageResource {
    #[must_use]
    pub fn new(sharp_idx: u32) -> Self {
        Self {
            sharp_idx,
            usage: ResourceUsage::empty(),
        }
    }

    #[must_use]
    pub fn with_usage(mut self, usage: ResourceUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Whether the image must be bound as a storage image rather than sampled.
    #[must_use]
    pub fn is_storage(&self, _sharp: &Image) -> bool {
        self.usage.intersects(ResourceUsage::WRITTEN | ResourceUsage::ATOMIC)
    }
}

impl ResolveSharp for ImageResource {
    type Sharp = Image;

    fn get_sharp(&self, ud: &UserData) -> Option<Image> {
        read_image(ud, self.sharp_idx)
    }
}

// ─── FMasks ───────────────────────────────────────────────────────────────────

/// Multisample fragment mask bound alongside an MSAA image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FMaskResource {
    pub sharp_idx: u32,
}

impl FMaskResource {
    #[must_use]
    pub fn new(sharp_idx: u32) -> Self {
        Self { sharp_idx }
    }
}

impl ResolveSharp for FMaskResource {
    type Sharp = Image;

    fn get_sharp(&self, ud: &UserData) -> Option<Image> {
        read_image(ud, self.sharp_idx)
    }
}

// ─── Samplers ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerResource {
    /// S# read from user data.
    UserData { sharp_idx: u32 },
    /// S# embedded as literals in the shader code.
    Inline(Sampler),
}

impl SamplerResource {
    #[must_use]
    pub fn new(sharp_idx: u32) -> Self {
        Self::UserData { sharp_idx }
    }
}

impl ResolveSharp for SamplerResource {
    type Sharp = Sampler;

    fn get_sharp(&self, ud: &UserData) -> Option<Sampler> {
        match *self {
            Self::UserData { sharp_idx } => ud
                .read_dwords::<{ Sampler::DWORDS }>(sharp_idx as usize)
                .map(Sampler::from_dwords),
            Self::Inline(sampler) => Some(sampler),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_storage_classification() {
        let sharp = Buffer::new(0x1000, 16, 64);
        let read_only = BufferResource::new(0);
        let written = BufferResource::new(0).with_usage(ResourceUsage::WRITTEN);

        assert!(!read_only.is_storage(&sharp, 64 * 1024));
        assert!(written.is_storage(&sharp, 64 * 1024));

        let large = Buffer::new(0x1000, 16, 8192);
        assert!(read_only.is_storage(&large, 64 * 1024));
    }

    #[test]
    fn test_unbound_buffer_does_not_resolve() {
        let mut ud = UserData::new();
        ud.write(0, &Buffer::null().to_dwords());
        assert!(BufferResource::new(0).get_sharp(&ud).is_none());

        ud.write(0, &Buffer::new(0x1000, 4, 4).to_dwords());
        assert!(BufferResource::new(0).get_sharp(&ud).is_some());
    }

    #[test]
    fn test_image_out_of_range_does_not_resolve() {
        let ud = UserData::new();
        // 8 dwords starting at 12 run past the SGPRs into an empty flattened buffer.
        assert!(ImageResource::new(12).get_sharp(&ud).is_none());
    }

    #[test]
    fn test_inline_sampler_always_resolves() {
        let inline = SamplerResource::Inline(Sampler::default().with_unnormalized(true));
        let resolved = inline.get_sharp(&UserData::new()).expect("inline sampler");
        assert!(resolved.force_unnormalized);
    }
}
