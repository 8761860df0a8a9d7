//! Permutation Cache
//!
//! Maps [`StageSpecialization`] keys to [`PermutationId`] handles. The caller
//! owns the compiled code and indexes its own storage with the id.
//!
//! # Lookup
//!
//! Key matching is gated by the cached key's validity mask, so it cannot be
//! expressed as a plain `Hash` + `Eq` map key. Entries are bucketed by
//! [`StageSpecialization::exact_hash`], which covers only the fields that
//! always compare exactly, and bucket members are resolved with
//! [`StageSpecialization::matches`]. Buckets are tiny in practice: one program
//! rarely runs with more than a couple of resource-format combinations.
//!
//! Keys are only ever matched against keys of the same program, identified by
//! layout address or [`ShaderInfo::pgm_hash`](crate::info::ShaderInfo::pgm_hash).

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::specialization::StageSpecialization;

/// Handle to a shader permutation recorded in a [`PermutationCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermutationId(pub(crate) u32);

impl PermutationId {
    /// Raw index, assigned sequentially from zero in insertion order.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[inline]
fn same_program(a: &StageSpecialization<'_>, b: &StageSpecialization<'_>) -> bool {
    std::ptr::eq(a.info(), b.info()) || a.info().pgm_hash == b.info().pgm_hash
}

type Bucket<'a> = SmallVec<[(StageSpecialization<'a>, PermutationId); 2]>;

/// Specialization-keyed permutation lookup for shader stages.
#[derive(Debug, Default)]
pub struct PermutationCache<'a> {
    buckets: FxHashMap<u64, Bucket<'a>>,
    len: u32,
}

impl<'a> PermutationCache<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a permutation compiled for a key that `candidate` matches.
    #[must_use]
    pub fn find(&self, candidate: &StageSpecialization<'a>) -> Option<PermutationId> {
        self.buckets
            .get(&candidate.exact_hash())?
            .iter()
            .find(|(cached, _)| same_program(candidate, cached) && candidate.matches(cached))
            .map(|&(_, id)| id)
    }

    /// Records `spec` as a new permutation without looking for a match.
    pub fn insert(&mut self, spec: StageSpecialization<'a>) -> PermutationId {
        let id = PermutationId(self.len);
        self.len += 1;

        let hash = spec.exact_hash();
        log::debug!(
            "New permutation {} for shader {:#018x} (bucket {hash:#018x})",
            id.0,
            spec.info().pgm_hash
        );
        self.buckets.entry(hash).or_default().push((spec, id));
        id
    }

    /// Returns the permutation matching `spec`, inserting it on a miss.
    pub fn get_or_insert(&mut self, spec: StageSpecialization<'a>) -> PermutationId {
        self.get_or_insert_with(spec, |_, _| {})
    }

    /// Like [`get_or_insert`](Self::get_or_insert), calling `on_miss` with the
    /// new id and key before it is recorded, e.g. to compile the permutation.
    pub fn get_or_insert_with(
        &mut self,
        spec: StageSpecialization<'a>,
        on_miss: impl FnOnce(PermutationId, &StageSpecialization<'a>),
    ) -> PermutationId {
        if let Some(id) = self.find(&spec) {
            return id;
        }
        log::debug!(
            "Permutation miss for shader {:#018x} ({:?})",
            spec.info().pgm_hash,
            spec.info().l_stage
        );
        on_miss(PermutationId(self.len), &spec);
        self.insert(spec)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry and restarts id numbering.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }
}
