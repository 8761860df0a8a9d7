//! Shader Info
//!
//! [`ShaderInfo`] is the static resource layout of a translated stage: the
//! ordered descriptor lists per category plus the stage metadata that
//! specialization depends on. It is produced once per shader module and stays
//! immutable afterwards, which lets specializations borrow it for as long as
//! the module lives.

use bytemuck::{Pod, Zeroable};
use smallvec::SmallVec;
use vellum_gpu::Buffer;

use crate::errors::{Result, ShaderError};
use crate::resources::{
    BufferResource, FMaskResource, ImageResource, SamplerResource, TextureBufferResource,
};
use crate::specialization::BindingMask;
use crate::stage::{LogicalStage, Stage};
use crate::user_data::UserData;

/// Location of an indirectly addressed V#: `dword_offset` dwords past the guest
/// pointer held in the SGPR pair at `sgpr_base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UdPointer {
    pub sgpr_base: u8,
    pub dword_offset: u8,
}

/// Constant buffer the driver fills for tessellation stages.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct TessellationDataConstantBuffer {
    pub ls_stride: u32,
    pub hs_cp_stride: u32,
    pub num_patches: u32,
    pub hs_output_base: u32,
    pub patch_const_size: u32,
    pub patch_const_base: u32,
    pub patch_output_size: u32,
    pub off_chip_tessellation_factor_threshold: f32,
    pub first_edge_tess_factor_index: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ShaderInfo {
    pub stage: Stage,
    pub l_stage: LogicalStage,
    /// Hash of the program bytecode; identifies the module in logs.
    pub pgm_hash: u64,
    /// The stage reads constants through an implicit buffer bound ahead of
    /// every declared resource.
    pub has_readconst: bool,

    pub buffers: SmallVec<[BufferResource; 16]>,
    pub texture_buffers: SmallVec<[TextureBufferResource; 8]>,
    pub images: SmallVec<[ImageResource; 16]>,
    pub fmasks: SmallVec<[FMaskResource; 8]>,
    pub samplers: SmallVec<[SamplerResource; 16]>,

    /// Fetch-shader bytecode called by a vertex stage, if any.
    pub fetch_shader: Option<Vec<u32>>,
    /// V# of the tessellation constant buffer, for tessellation stages.
    pub tess_consts_ptr: Option<UdPointer>,
}

impl ShaderInfo {
    #[must_use]
    pub fn new(stage: Stage, l_stage: LogicalStage) -> Self {
        Self {
            stage,
            l_stage,
            ..Self::default()
        }
    }

    /// Slots of the shared binding index tracked by specialization: the
    /// read-const slot, then buffers, texture buffers, images and fmasks.
    #[must_use]
    pub fn num_tracked_bindings(&self) -> usize {
        usize::from(self.has_readconst)
            + self.buffers.len()
            + self.texture_buffers.len()
            + self.images.len()
            + self.fmasks.len()
    }

    /// Checks the layout fits a specialization key.
    pub fn validate(&self) -> Result<()> {
        let count = self.num_tracked_bindings();
        if count > BindingMask::CAPACITY {
            return Err(ShaderError::TooManyBindings {
                count,
                max: BindingMask::CAPACITY,
            });
        }
        Ok(())
    }

    /// Reads the tessellation constant buffer for this dispatch.
    ///
    /// Drivers always provide it for tessellation stages; if it cannot be read
    /// the defaults are returned and a warning is logged.
    #[must_use]
    pub fn read_tess_constant_buffer(&self, ud: &UserData) -> TessellationDataConstantBuffer {
        let Some(ptr) = self.tess_consts_ptr else {
            log::warn!(
                "Shader {:#018x} has no tessellation constant buffer pointer",
                self.pgm_hash
            );
            return TessellationDataConstantBuffer::default();
        };

        let constants: Option<TessellationDataConstantBuffer> = ud
            .read_indirect::<{ Buffer::DWORDS }>(
                usize::from(ptr.sgpr_base),
                usize::from(ptr.dword_offset),
            )
            .map(Buffer::from_dwords)
            .filter(Buffer::is_valid)
            .and_then(|sharp| ud.memory().read(sharp.base_address));

        constants.unwrap_or_else(|| {
            log::warn!(
                "Shader {:#018x}: tessellation constants unreadable (s{} + {})",
                self.pgm_hash,
                ptr.sgpr_base,
                ptr.dword_offset
            );
            TessellationDataConstantBuffer::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_binding_count_includes_readconst() {
        let mut info = ShaderInfo::new(Stage::Fragment, LogicalStage::Fragment);
        info.buffers.push(BufferResource::new(0));
        info.images.push(ImageResource::new(4));
        info.samplers.push(SamplerResource::new(12));
        assert_eq!(info.num_tracked_bindings(), 2);

        info.has_readconst = true;
        assert_eq!(info.num_tracked_bindings(), 3);
        assert!(info.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_layout() {
        let mut info = ShaderInfo::new(Stage::Compute, LogicalStage::Compute);
        info.has_readconst = true;
        info.buffers.extend((0..64).map(|i| BufferResource::new(i * 4)));
        assert!(matches!(
            info.validate(),
            Err(ShaderError::TooManyBindings { count: 65, max: 64 })
        ));
    }

    #[test]
    fn test_read_tess_constants() {
        let constants = TessellationDataConstantBuffer {
            ls_stride: 48,
            hs_cp_stride: 32,
            num_patches: 7,
            hs_output_base: 0x400,
            ..Default::default()
        };

        let mut ud = UserData::new();
        ud.write_pointer(0, 0x8000);
        ud.memory_mut()
            .map_dwords(0x8000, &Buffer::new(0x9000, 0, 36).to_dwords());
        ud.memory_mut()
            .map(0x9000, bytemuck::bytes_of(&constants).to_vec());

        let mut info = ShaderInfo::new(Stage::Hull, LogicalStage::TessellationControl);
        info.tess_consts_ptr = Some(UdPointer {
            sgpr_base: 0,
            dword_offset: 0,
        });

        assert_eq!(info.read_tess_constant_buffer(&ud), constants);
    }

    #[test]
    fn test_missing_tess_constants_fall_back_to_defaults() {
        let info = ShaderInfo::new(Stage::Hull, LogicalStage::TessellationControl);
        assert_eq!(
            info.read_tess_constant_buffer(&UserData::new()),
            TessellationDataConstantBuffer::default()
        );
    }
}
