//! Error Types
//!
//! # Overview
//!
//! [`ShaderError`] covers the failure modes of this crate:
//! - Fetch-shader bytecode that cannot be decoded
//! - Capability profiles that fail to parse
//! - Stage layouts that exceed the tracked binding capacity
//!
//! A descriptor that does not resolve to a valid hardware record is **not** an
//! error: specialization treats it as an unbound slot.

use thiserror::Error;

/// The error type for shader info and specialization operations.
#[derive(Error, Debug)]
pub enum ShaderError {
    // ========================================================================
    // Fetch Shader Decoding
    // ========================================================================
    /// An instruction word matches no encoding a fetch shader may contain.
    #[error("Unknown fetch shader encoding {word:#010x} at dword {pc}")]
    UnknownEncoding {
        /// Dword offset of the instruction
        pc: usize,
        /// The offending instruction word
        word: u32,
    },

    /// The encoding is known but the opcode is not supported in a fetch shader.
    #[error("Unsupported fetch shader opcode {op} at dword {pc}")]
    UnsupportedOpcode {
        /// Dword offset of the instruction
        pc: usize,
        /// Decoded opcode field
        op: u32,
    },

    /// A multi-dword instruction or literal runs past the end of the code.
    #[error("Fetch shader truncated at dword {pc}")]
    Truncated {
        /// Dword offset of the incomplete instruction
        pc: usize,
    },

    /// A scalar load places a V# past the 256-dword reach of its table pointer.
    #[error("Fetch shader loads V# at dword offset {offset} past the table (dword {pc})")]
    SharpOffsetOutOfRange {
        /// Dword offset of the scalar load
        pc: usize,
        /// Table offset of the out-of-range V#
        offset: u32,
    },

    /// The code ends without an `s_setpc_b64` return.
    #[error("Fetch shader has no return instruction")]
    MissingTerminator,

    /// A buffer load reads through an SGPR quad no scalar load has written.
    #[error("Fetch shader reads V# from s{sgpr} before loading it (dword {pc})")]
    UnboundVsharp {
        /// Dword offset of the load
        pc: usize,
        /// First SGPR of the resource quad
        sgpr: u32,
    },

    // ========================================================================
    // Stage Layout
    // ========================================================================
    /// The stage declares more tracked resources than a specialization can hold.
    #[error("Stage declares {count} tracked bindings (max {max})")]
    TooManyBindings {
        /// Tracked slots requested, including the read-const slot
        count: usize,
        /// Capacity of the validity mask
        max: usize,
    },

    // ========================================================================
    // Configuration
    // ========================================================================
    /// Profile JSON parsing error.
    #[error("Profile parse error: {0}")]
    ProfileParse(#[from] serde_json::Error),
}

/// Alias for `Result<T, ShaderError>`.
pub type Result<T> = std::result::Result<T, ShaderError>;
