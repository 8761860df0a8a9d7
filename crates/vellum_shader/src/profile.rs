//! Host Capability Profile
//!
//! Describes what the host backend can express natively. The profile only
//! steers how a specialization is built; it is never part of the key, since a
//! process runs against a single profile.
//!
//! ```rust,ignore
//! use vellum_shader::Profile;
//!
//! let profile = Profile::from_json(r#"{ "support_legacy_vertex_attributes": true }"#)?;
//! assert_eq!(profile.max_ubo_size, Profile::DEFAULT_MAX_UBO_SIZE);
//! ```

use serde::Deserialize;

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// The host converts vertex attribute formats itself, so shaders need not
    /// be specialized on the number class of each input.
    pub support_legacy_vertex_attributes: bool,
    /// Buffers larger than this many bytes cannot be bound as uniform buffers
    /// and are bound as storage buffers instead.
    pub max_ubo_size: u64,
}

impl Profile {
    pub const DEFAULT_MAX_UBO_SIZE: u64 = 64 * 1024;

    /// Parses a profile, filling omitted fields with their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            support_legacy_vertex_attributes: false,
            max_ubo_size: Self::DEFAULT_MAX_UBO_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let profile = Profile::from_json(r#"{ "support_legacy_vertex_attributes": true }"#)
            .expect("valid profile");
        assert!(profile.support_legacy_vertex_attributes);
        assert_eq!(profile.max_ubo_size, Profile::DEFAULT_MAX_UBO_SIZE);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Profile::from_json("{ support_legacy_vertex_attributes }").is_err());
    }
}
