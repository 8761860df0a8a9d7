//! Stage Specialization Keys
//!
//! A [`StageSpecialization`] captures everything about a dispatch that changes
//! the code generated for a shader stage, without the parts that do not:
//! resource addresses, buffer sizes and samplers' filter state never reach it.
//! It is built once per dispatch and used as a lookup key in the
//! [`PermutationCache`](crate::cache::PermutationCache).
//!
//! # Binding Index
//!
//! Buffers, texture buffers, images and fmasks share one sequential binding
//! index, in that order, preceded by an implicit slot for the read-const
//! buffer when the stage has one. Every descriptor consumes one index whether
//! or not it resolved. [`BindingMask`] records which of them did.
//!
//! # Matching
//!
//! [`StageSpecialization::matches`] is deliberately asymmetric. A tracked slot
//! that was unbound when the cached key was built did not influence the code
//! compiled for it, so the candidate may hold anything there. Slots bound in
//! the cached key must match exactly. Samplers are not tracked and always
//! compare in full.
//!
//! ```text
//!   binding:    0         1        2        3
//!              [readconst][buf 0  ][buf 1  ][img 0  ]
//!   cached:     1          1        0        1
//!   compared:   -          yes      no       yes
//! ```

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use smallvec::SmallVec;
use vellum_gpu::{
    Buffer, CompMapping, Image, ImageType, NumberClass, NumberConversion, Sampler, is_integer,
    number_class,
};

use crate::bindings::Bindings;
use crate::fetch_shader::{FetchShaderData, parse_fetch_shader};
use crate::info::ShaderInfo;
use crate::profile::Profile;
use crate::resources::ResolveSharp;
use crate::runtime_info::RuntimeInfo;
use crate::stage::{LogicalStage, Stage};
use crate::user_data::UserData;

// ─── Binding Mask ─────────────────────────────────────────────────────────────

/// Validity flags over the shared binding index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BindingMask(u64);

impl BindingMask {
    pub const CAPACITY: usize = 64;

    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn set(&mut self, binding: usize) {
        debug_assert!(binding < Self::CAPACITY, "binding {binding} out of range");
        if binding < Self::CAPACITY {
            self.0 |= 1 << binding;
        }
    }

    /// Bindings past the capacity are never set.
    #[inline]
    #[must_use]
    pub fn is_set(self, binding: usize) -> bool {
        binding < Self::CAPACITY && self.0 & (1 << binding) != 0
    }

    #[inline]
    #[must_use]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub fn bits(self) -> u64 {
        self.0
    }
}

// ─── Per-Resource Records ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VsAttribSpecialization {
    pub num_class: NumberClass,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BufferSpecialization {
    /// Fits in 14 bits (see [`vellum_gpu::MAX_BUFFER_STRIDE`]).
    pub stride: u16,
    pub is_storage: bool,
    /// Only populated for buffers bound as uniform buffers.
    pub size: u64,
}

impl PartialEq for BufferSpecialization {
    fn eq(&self, other: &Self) -> bool {
        // The size clause holds for every input, so size never splits keys.
        self.stride == other.stride
            && self.is_storage == other.is_storage
            && (other.size >= u64::from(other.is_storage) || other.is_storage)
    }
}

impl Eq for BufferSpecialization {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureBufferSpecialization {
    pub is_integer: bool,
    pub dst_select: CompMapping,
    pub num_conversion: NumberConversion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageSpecialization {
    pub ty: ImageType,
    pub is_integer: bool,
    pub is_storage: bool,
    /// Left at its default unless the image is bound for storage.
    pub dst_select: CompMapping,
    pub num_conversion: NumberConversion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FMaskSpecialization {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SamplerSpecialization {
    pub force_unnormalized: bool,
}

// ─── Builder Helpers ──────────────────────────────────────────────────────────

/// Running position in the shared binding index.
struct BindingCursor {
    next: usize,
    mask: BindingMask,
}

impl BindingCursor {
    fn new(has_readconst: bool) -> Self {
        Self {
            next: usize::from(has_readconst),
            mask: BindingMask::new(),
        }
    }

    /// Consumes one binding, marking it valid if the descriptor resolved.
    fn advance(&mut self, resolved: bool) -> usize {
        let binding = self.next;
        if resolved {
            self.mask.set(binding);
        }
        self.next += 1;
        binding
    }
}

/// Appends one record per descriptor to `out` and fills it from the resolved
/// sharp. Records of unresolved descriptors keep their defaults.
///
/// With a `cursor`, each descriptor also consumes a binding index.
fn for_each_sharp<D, A>(
    category: &str,
    ud: &UserData,
    descs: &[D],
    out: &mut SmallVec<A>,
    mut cursor: Option<&mut BindingCursor>,
    mut fill: impl FnMut(&mut A::Item, &D, D::Sharp),
) where
    D: ResolveSharp,
    A: smallvec::Array,
    A::Item: Default,
{
    out.reserve(descs.len());
    for (index, desc) in descs.iter().enumerate() {
        let mut record = A::Item::default();
        let sharp = desc.get_sharp(ud);
        let resolved = sharp.is_some();

        let binding = cursor.as_deref_mut().map(|c| c.advance(resolved));
        match sharp {
            Some(sharp) => fill(&mut record, desc, sharp),
            None => log::trace!("Unresolved {category} {index} (binding {binding:?})"),
        }
        out.push(record);
    }
}

fn gated_eq<T: PartialEq>(
    candidate: &[T],
    cached: &[T],
    cached_mask: BindingMask,
    binding: &mut usize,
) -> bool {
    let first = *binding;
    *binding += cached.len();
    candidate
        .iter()
        .zip(cached)
        .enumerate()
        .all(|(i, (a, b))| !cached_mask.is_set(first + i) || a == b)
}

// ─── StageSpecialization ──────────────────────────────────────────────────────

/// Specialization key of one shader stage for one dispatch.
///
/// Borrows the stage's [`ShaderInfo`]; the shader module that owns it must
/// outlive every key built from it.
#[derive(Debug, Clone)]
pub struct StageSpecialization<'a> {
    info: &'a ShaderInfo,
    runtime_info: RuntimeInfo,
    fetch_shader_data: Option<FetchShaderData>,
    vs_attribs: SmallVec<[VsAttribSpecialization; 32]>,
    bitset: BindingMask,
    buffers: SmallVec<[BufferSpecialization; 16]>,
    tex_buffers: SmallVec<[TextureBufferSpecialization; 8]>,
    images: SmallVec<[ImageSpecialization; 16]>,
    fmasks: SmallVec<[FMaskSpecialization; 8]>,
    samplers: SmallVec<[SamplerSpecialization; 16]>,
    start: Bindings,
}

impl<'a> StageSpecialization<'a> {
    /// Builds the key for dispatching `info` with the sharps currently in `ud`.
    ///
    /// `info` must not track more than [`BindingMask::CAPACITY`] bindings;
    /// check with [`ShaderInfo::validate`] when the layout is created.
    #[must_use]
    pub fn new(
        info: &'a ShaderInfo,
        ud: &UserData,
        runtime_info: RuntimeInfo,
        profile: &Profile,
        start: Bindings,
    ) -> Self {
        debug_assert!(
            info.num_tracked_bindings() <= BindingMask::CAPACITY,
            "shader {:#018x} tracks {} bindings",
            info.pgm_hash,
            info.num_tracked_bindings()
        );

        let mut spec = Self {
            info,
            runtime_info,
            fetch_shader_data: parse_fetch_shader(info),
            vs_attribs: SmallVec::new(),
            bitset: BindingMask::new(),
            buffers: SmallVec::new(),
            tex_buffers: SmallVec::new(),
            images: SmallVec::new(),
            fmasks: SmallVec::new(),
            samplers: SmallVec::new(),
            start,
        };

        if info.stage == Stage::Vertex && !profile.support_legacy_vertex_attributes {
            if let Some(fetch) = &spec.fetch_shader_data {
                for_each_sharp(
                    "vertex attribute",
                    ud,
                    &fetch.attributes,
                    &mut spec.vs_attribs,
                    None,
                    |rec, _, sharp: Buffer| rec.num_class = number_class(sharp.number_format()),
                );
            }
        }

        let mut cursor = BindingCursor::new(info.has_readconst);

        for_each_sharp(
            "buffer",
            ud,
            &info.buffers,
            &mut spec.buffers,
            Some(&mut cursor),
            |rec, desc, sharp: Buffer| {
                rec.stride = sharp.stride();
                rec.is_storage = desc.is_storage(&sharp, profile.max_ubo_size);
                if !rec.is_storage {
                    rec.size = sharp.size();
                }
            },
        );
        for_each_sharp(
            "texture buffer",
            ud,
            &info.texture_buffers,
            &mut spec.tex_buffers,
            Some(&mut cursor),
            |rec, _, sharp: Buffer| {
                rec.is_integer = is_integer(sharp.number_format());
                rec.dst_select = sharp.dst_select();
                rec.num_conversion = sharp.number_conversion();
            },
        );
        for_each_sharp(
            "image",
            ud,
            &info.images,
            &mut spec.images,
            Some(&mut cursor),
            |rec, desc, sharp: Image| {
                rec.ty = sharp.bound_type();
                rec.is_integer = is_integer(sharp.number_format());
                rec.is_storage = desc.is_storage(&sharp);
                if rec.is_storage {
                    rec.dst_select = sharp.dst_select();
                }
                rec.num_conversion = sharp.number_conversion();
            },
        );
        for_each_sharp(
            "fmask",
            ud,
            &info.fmasks,
            &mut spec.fmasks,
            Some(&mut cursor),
            |rec, _, sharp: Image| {
                rec.width = sharp.width();
                rec.height = sharp.height();
            },
        );
        spec.bitset = cursor.mask;

        for_each_sharp(
            "sampler",
            ud,
            &info.samplers,
            &mut spec.samplers,
            None,
            |rec, _, sharp: Sampler| rec.force_unnormalized = sharp.force_unnormalized,
        );

        match info.l_stage {
            LogicalStage::TessellationControl => {
                let tess_constants = info.read_tess_constant_buffer(ud);
                spec.runtime_info.hs_info.init_from_tess_constants(&tess_constants);
            }
            LogicalStage::TessellationEval => {
                let tess_constants = info.read_tess_constant_buffer(ud);
                spec.runtime_info.vs_info.init_from_tess_constants(&tess_constants);
            }
            _ => {}
        }

        log::debug!(
            "Specialized shader {:#018x} ({:?}): {} buffers, {} texture buffers, {} images, {} fmasks, {} samplers, {}/{} bindings valid",
            info.pgm_hash,
            info.l_stage,
            spec.buffers.len(),
            spec.tex_buffers.len(),
            spec.images.len(),
            spec.fmasks.len(),
            spec.samplers.len(),
            spec.bitset.count(),
            cursor.next,
        );

        spec
    }

    /// Whether code compiled for `cached` can run this dispatch.
    ///
    /// Not symmetric: tracked slots unbound in `cached` are skipped, whatever
    /// `self` holds there. Both keys must come from the same [`ShaderInfo`]
    /// layout.
    #[must_use]
    pub fn matches(&self, cached: &Self) -> bool {
        if self.start != cached.start
            || self.runtime_info != cached.runtime_info
            || self.fetch_shader_data != cached.fetch_shader_data
            || self.vs_attribs != cached.vs_attribs
        {
            return false;
        }

        if self.info.has_readconst != cached.info.has_readconst {
            return false;
        }
        let mut binding = usize::from(cached.info.has_readconst);
        let mask = cached.bitset;

        gated_eq(&self.buffers, &cached.buffers, mask, &mut binding)
            && gated_eq(&self.tex_buffers, &cached.tex_buffers, mask, &mut binding)
            && gated_eq(&self.images, &cached.images, mask, &mut binding)
            && gated_eq(&self.fmasks, &cached.fmasks, mask, &mut binding)
            && self.samplers == cached.samplers
    }

    /// Hash of the fields [`matches`](Self::matches) always compares exactly.
    ///
    /// Keys that match hash equally, so a cache can bucket on this value and
    /// resolve bucket members with `matches`. The program hash is mixed in so
    /// that different programs rarely share a bucket. The validity mask and
    /// tracked records are left out since they only take part in gated comparison.
    #[must_use]
    pub fn exact_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.info.pgm_hash.hash(&mut hasher);
        self.start.hash(&mut hasher);
        self.runtime_info.hash(&mut hasher);
        self.fetch_shader_data.hash(&mut hasher);
        self.vs_attribs.hash(&mut hasher);
        self.samplers.hash(&mut hasher);
        self.info.has_readconst.hash(&mut hasher);
        hasher.finish()
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub fn info(&self) -> &'a ShaderInfo {
        self.info
    }

    #[inline]
    #[must_use]
    pub fn runtime_info(&self) -> &RuntimeInfo {
        &self.runtime_info
    }

    #[inline]
    #[must_use]
    pub fn fetch_shader_data(&self) -> Option<&FetchShaderData> {
        self.fetch_shader_data.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn vs_attribs(&self) -> &[VsAttribSpecialization] {
        &self.vs_attribs
    }

    #[inline]
    #[must_use]
    pub fn bitset(&self) -> BindingMask {
        self.bitset
    }

    #[inline]
    #[must_use]
    pub fn buffers(&self) -> &[BufferSpecialization] {
        &self.buffers
    }

    #[inline]
    #[must_use]
    pub fn tex_buffers(&self) -> &[TextureBufferSpecialization] {
        &self.tex_buffers
    }

    #[inline]
    #[must_use]
    pub fn images(&self) -> &[ImageSpecialization] {
        &self.images
    }

    #[inline]
    #[must_use]
    pub fn fmasks(&self) -> &[FMaskSpecialization] {
        &self.fmasks
    }

    #[inline]
    #[must_use]
    pub fn samplers(&self) -> &[SamplerSpecialization] {
        &self.samplers
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> Bindings {
        self.start
    }
}
