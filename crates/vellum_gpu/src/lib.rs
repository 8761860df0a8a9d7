//! GCN hardware resource descriptors.
//!
//! Shaders address their resources through small descriptor records ("sharps")
//! that live in user-data registers or guest memory:
//!
//! - [`Buffer`]: V#, 4 dwords
//! - [`Image`]: T#, 8 dwords
//! - [`Sampler`]: S#, 4 dwords
//!
//! Each type decodes from raw dwords into plain fields and can be encoded back,
//! which is how tests and tools build user data by hand.

mod bits;

pub mod buffer;
pub mod comp_mapping;
pub mod image;
pub mod number_format;
pub mod sampler;

pub use buffer::{Buffer, MAX_BUFFER_STRIDE};
pub use comp_mapping::{CompMapping, CompSwizzle};
pub use image::{Image, ImageType};
pub use number_format::{
    DataFormat, NumberClass, NumberConversion, NumberFormat, is_integer, map_number_conversion,
    number_class, remap_number_format,
};
pub use sampler::{ClampMode, Sampler};
