//! # Vellum
//!
//! Shader specialization keys for a GCN shader recompiler.
//!
//! A translated shader stage declares its resources abstractly; the hardware
//! descriptors ("sharps") behind them are only known at dispatch time. Vellum
//! turns a stage layout plus the dispatch state into a
//! [`StageSpecialization`] and decides whether an already compiled
//! permutation can run it.
//!
//! # Crates
//!
//! - [`gpu`]: V#, T# and S# records and number-format helpers
//! - [`shader`]: stage layout, fetch-shader parsing, runtime info,
//!   specialization keys and the permutation cache
//!
//! # Example
//!
//! ```rust,ignore
//! use vellum::{Bindings, BufferResource, PermutationCache, Profile, RuntimeInfo, ShaderInfo,
//!              Stage, LogicalStage, StageSpecialization, UserData};
//!
//! let mut info = ShaderInfo::new(Stage::Compute, LogicalStage::Compute);
//! info.buffers.push(BufferResource::new(0));
//! info.validate()?;
//!
//! let mut cache = PermutationCache::new();
//! let spec = StageSpecialization::new(
//!     &info,
//!     &ud,
//!     RuntimeInfo::new(Stage::Compute),
//!     &Profile::default(),
//!     Bindings::default(),
//! );
//! let id = cache.get_or_insert(spec);
//! ```

pub use vellum_gpu as gpu;
pub use vellum_shader as shader;

pub use vellum_gpu::{
    Buffer, CompMapping, CompSwizzle, DataFormat, Image, ImageType, NumberClass,
    NumberConversion, NumberFormat, Sampler,
};
pub use vellum_shader::{
    BindingMask, Bindings, BufferResource, FMaskResource, FetchShaderData, ImageResource,
    LogicalStage, PermutationCache, PermutationId, Profile, ResourceUsage, RuntimeInfo,
    SamplerResource, ShaderError, ShaderInfo, Stage, StageSpecialization, TextureBufferResource,
    UserData,
};
