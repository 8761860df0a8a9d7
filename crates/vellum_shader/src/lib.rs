//! Shader stage layout and specialization keys.
//!
//! # Overview
//!
//! - [`ShaderInfo`]: static resource layout of a translated stage
//! - [`UserData`]: per-dispatch snapshot the sharps are read from
//! - [`FetchShaderData`]: vertex attributes recovered from a fetch shader
//! - [`RuntimeInfo`]: execution-time configuration baked into generated code
//! - [`StageSpecialization`]: the key deciding whether a compiled permutation
//!   can be reused
//! - [`PermutationCache`]: key to permutation id lookup
//!
//! ```rust,ignore
//! let spec = StageSpecialization::new(&info, &ud, runtime_info, &profile, Bindings::default());
//! let id = cache.get_or_insert_with(spec, |id, spec| compile(id, spec));
//! ```

pub mod bindings;
pub mod cache;
pub mod errors;
pub mod fetch_shader;
pub mod info;
pub mod profile;
pub mod resources;
pub mod runtime_info;
pub mod specialization;
pub mod stage;
pub mod user_data;

pub use bindings::Bindings;
pub use cache::{PermutationCache, PermutationId};
pub use errors::{Result, ShaderError};
pub use fetch_shader::{FetchShaderData, InputStep, VertexAttribute, parse_fetch_shader};
pub use info::{ShaderInfo, TessellationDataConstantBuffer, UdPointer};
pub use profile::Profile;
pub use resources::{
    BufferResource, FMaskResource, ImageResource, ResolveSharp, ResourceUsage, SamplerResource,
    TextureBufferResource,
};
pub use runtime_info::RuntimeInfo;
pub use specialization::{
    BindingMask, BufferSpecialization, FMaskSpecialization, ImageSpecialization,
    SamplerSpecialization, StageSpecialization, TextureBufferSpecialization,
    VsAttribSpecialization,
};
pub use stage::{LogicalStage, Stage};
pub use user_data::{GuestMemory, NUM_USER_SGPRS, UserData};
