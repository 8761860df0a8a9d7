//! Runtime Info
//!
//! Execution-time configuration that is not visible in the shader binary but
//! changes the generated code: output counts, tessellation domain, color
//! buffer formats, workgroup size and so on.
//!
//! # Equality
//!
//! [`RuntimeInfo`] carries one sub-record per hardware stage, but only the
//! record of the active [`Stage`] is meaningful. Equality and hashing compare
//! the common fields plus that record, so stale values left in the others
//! never split a cache bucket.

use std::hash::{Hash, Hasher};

use smallvec::SmallVec;
use vellum_gpu::{CompMapping, NumberConversion, NumberFormat};

use crate::info::TessellationDataConstantBuffer;
use crate::stage::Stage;

pub const MAX_COLOR_BUFFERS: usize = 8;

// ─── Enums ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TessellationType {
    Isoline,
    #[default]
    Triangle,
    Quad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TessellationTopology {
    Point,
    Line,
    #[default]
    TriangleCw,
    TriangleCcw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TessellationPartitioning {
    #[default]
    Integer,
    Pow2,
    FracOdd,
    FracEven,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveType {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
    RectList,
    QuadList,
    Patch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FpDenormMode {
    InOutFlush,
    InAllowOutFlush,
    InFlushOutAllow,
    #[default]
    InOutAllow,
}

// ─── Per-Stage Records ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VertexRuntimeInfo {
    pub num_outputs: u32,
    pub emulate_depth_negative_one_to_one: bool,
    pub clip_disable: bool,
    pub tess_type: TessellationType,
    pub tess_topology: TessellationTopology,
    pub tess_partitioning: TessellationPartitioning,
    pub hs_output_cp_stride: u32,
}

impl VertexRuntimeInfo {
    /// Fills the tessellation-evaluation parameters from the driver constants.
    pub fn init_from_tess_constants(&mut self, tess_constants: &TessellationDataConstantBuffer) {
        self.hs_output_cp_stride = tess_constants.hs_cp_stride;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HullRuntimeInfo {
    pub num_input_control_points: u32,
    pub num_threads: u32,
    pub tess_type: TessellationType,
    pub ls_stride: u32,
    pub hs_output_cp_stride: u32,
    pub hs_output_base: u32,
}

impl HullRuntimeInfo {
    pub fn init_from_tess_constants(&mut self, tess_constants: &TessellationDataConstantBuffer) {
        self.ls_stride = tess_constants.ls_stride;
        self.hs_output_cp_stride = tess_constants.hs_cp_stride;
        self.hs_output_base = tess_constants.hs_output_base;
    }

    /// Whether each invocation handles one output control point.
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.ls_stride == self.hs_output_cp_stride && self.num_threads == self.num_input_control_points
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExportRuntimeInfo {
    pub vertex_data_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GeometryRuntimeInfo {
    pub num_invocations: u32,
    pub output_vertices: u32,
    pub in_vertex_data_size: u32,
    pub out_vertex_data_size: u32,
    pub in_primitive: PrimitiveType,
    pub out_primitive: PrimitiveType,
}

/// Format of one bound color target as seen by the pixel shader exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorBuffer {
    pub num_format: NumberFormat,
    pub num_conversion: NumberConversion,
    pub swizzle: CompMapping,
    pub needs_unorm_fixup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FragmentRuntimeInfo {
    pub num_inputs: u32,
    pub en_flags: u32,
    pub addr_flags: u32,
    pub color_buffers: SmallVec<[ColorBuffer; MAX_COLOR_BUFFERS]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ComputeRuntimeInfo {
    pub shared_memory_size: u32,
    pub workgroup_size: [u32; 3],
    pub tgid_enable: [bool; 3],
}

impl ComputeRuntimeInfo {
    #[must_use]
    pub fn num_invocations(&self) -> u32 {
        self.workgroup_size.iter().product()
    }
}

// ─── RuntimeInfo ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct RuntimeInfo {
    pub stage: Stage,
    pub num_user_data: u32,
    pub num_input_vgprs: u32,
    pub num_allocated_vgprs: u32,
    pub fp_denorm_mode32: FpDenormMode,
    pub vs_info: VertexRuntimeInfo,
    pub hs_info: HullRuntimeInfo,
    pub es_info: ExportRuntimeInfo,
    pub gs_info: GeometryRuntimeInfo,
    pub fs_info: FragmentRuntimeInfo,
    pub cs_info: ComputeRuntimeInfo,
}

impl RuntimeInfo {
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            ..Self::default()
        }
    }

    fn common(&self) -> (Stage, u32, u32, u32, FpDenormMode) {
        (
            self.stage,
            self.num_user_data,
            self.num_input_vgprs,
            self.num_allocated_vgprs,
            self.fp_denorm_mode32,
        )
    }
}

impl PartialEq for RuntimeInfo {
    fn eq(&self, other: &Self) -> bool {
        if self.common() != other.common() {
            return false;
        }
        match self.stage {
            Stage::Vertex | Stage::Local => self.vs_info == other.vs_info,
            Stage::Hull => self.hs_info == other.hs_info,
            Stage::Export => self.es_info == other.es_info,
            Stage::Geometry => self.gs_info == other.gs_info,
            Stage::Fragment => self.fs_info == other.fs_info,
            Stage::Compute => self.cs_info == other.cs_info,
        }
    }
}

impl Eq for RuntimeInfo {}

impl Hash for RuntimeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.common().hash(state);
        match self.stage {
            Stage::Vertex | Stage::Local => self.vs_info.hash(state),
            Stage::Hull => self.hs_info.hash(state),
            Stage::Export => self.es_info.hash(state),
            Stage::Geometry => self.gs_info.hash(state),
            Stage::Fragment => self.fs_info.hash(state),
            Stage::Compute => self.cs_info.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_stage_records_are_ignored() {
        let mut a = RuntimeInfo::new(Stage::Compute);
        a.cs_info.workgroup_size = [64, 1, 1];
        let mut b = a.clone();
        b.vs_info.num_outputs = 12;
        b.fs_info.num_inputs = 3;
        assert_eq!(a, b);

        b.cs_info.workgroup_size = [32, 2, 1];
        assert_ne!(a, b);
    }

    #[test]
    fn test_common_fields_always_compared() {
        let a = RuntimeInfo::new(Stage::Fragment);
        let mut b = a.clone();
        b.num_user_data = 4;
        assert_ne!(a, b);
        assert_ne!(a, RuntimeInfo::new(Stage::Vertex));
    }

    #[test]
    fn test_hull_init_from_tess_constants() {
        let constants = TessellationDataConstantBuffer {
            ls_stride: 64,
            hs_cp_stride: 48,
            hs_output_base: 0x200,
            ..Default::default()
        };
        let mut hs = HullRuntimeInfo {
            num_input_control_points: 3,
            num_threads: 3,
            ..Default::default()
        };
        hs.init_from_tess_constants(&constants);

        assert_eq!(hs.ls_stride, 64);
        assert_eq!(hs.hs_output_cp_stride, 48);
        assert_eq!(hs.hs_output_base, 0x200);
        assert!(!hs.is_passthrough());
    }

    #[test]
    fn test_workgroup_invocations() {
        let cs = ComputeRuntimeInfo {
            workgroup_size: [8, 8, 2],
            ..Default::default()
        };
        assert_eq!(cs.num_invocations(), 128);
    }
}
