//! Hardware and logical shader stages.

/// Hardware stage a program is bound to.
///
/// GCN runs the API-level stages on a fixed set of hardware stages; which one
/// depends on the pipeline configuration (e.g. a vertex shader runs as `Local`
/// when tessellation is enabled and as `Export` in front of a geometry shader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    Fragment,
    #[default]
    Vertex,
    Geometry,
    Export,
    Hull,
    Local,
    Compute,
}

/// Role the program plays in the API pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogicalStage {
    Fragment,
    TessellationControl,
    TessellationEval,
    #[default]
    Vertex,
    Geometry,
    Compute,
}

impl LogicalStage {
    #[inline]
    #[must_use]
    pub fn is_tessellation(self) -> bool {
        matches!(self, Self::TessellationControl | Self::TessellationEval)
    }
}
