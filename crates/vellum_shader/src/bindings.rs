/// First bind points assigned to a stage's resources in the host pipeline layout.
///
/// Stages of one pipeline share a single resource table, so each stage starts
/// where the previous one ended. Code generated for a stage bakes these offsets
/// in, which makes them part of every specialization key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bindings {
    /// Next index in the unified descriptor set.
    pub unified: u32,
    /// Next buffer index.
    pub buffer: u32,
    /// Next push-constant user-data slot.
    pub user_data: u32,
}

impl Bindings {
    #[must_use]
    pub const fn new(unified: u32, buffer: u32, user_data: u32) -> Self {
        Self {
            unified,
            buffer,
            user_data,
        }
    }
}
