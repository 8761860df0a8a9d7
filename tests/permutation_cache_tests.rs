//! Permutation Cache Integration Tests
//!
//! Tests for:
//! - Hit / miss / insert behavior of `PermutationCache`
//! - Gated lookups landing in the same bucket
//! - Keys from different programs never matching
//! - Id numbering, `len` and `clear`

use vellum::shader::PermutationCache;
use vellum::{
    Bindings, Buffer, BufferResource, Image, ImageResource, LogicalStage, Profile, RuntimeInfo, Sampler,
    SamplerResource, ShaderInfo, Stage, StageSpecialization, UserData,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn layout() -> ShaderInfo {
    let mut info = ShaderInfo::new(Stage::Fragment, LogicalStage::Fragment);
    info.pgm_hash = 0xDEAD_BEEF;
    info.buffers.push(BufferResource::new(0));
    info.samplers.push(SamplerResource::new(4));
    info
}

fn user_data(buffer: Buffer, unnormalized: bool) -> UserData {
    let mut ud = UserData::new();
    ud.write(0, &buffer.to_dwords());
    ud.write(4, &Sampler::default().with_unnormalized(unnormalized).to_dwords());
    ud
}

fn key<'a>(info: &'a ShaderInfo, ud: &UserData) -> StageSpecialization<'a> {
    StageSpecialization::new(
        info,
        ud,
        RuntimeInfo::new(Stage::Fragment),
        &Profile::default(),
        Bindings::default(),
    )
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn cache_starts_empty() {
    let info = layout();
    let cache = PermutationCache::new();
    assert!(cache.is_empty());
    assert_eq!(cache.len(), 0);

    let spec = key(&info, &user_data(Buffer::new(0x1000, 16, 4), false));
    assert!(cache.find(&spec).is_none());
}

#[test]
fn cache_hit_returns_existing_id() {
    init_logger();
    let info = layout();
    let mut cache = PermutationCache::new();

    let first = cache.get_or_insert(key(&info, &user_data(Buffer::new(0x1000, 16, 4), false)));
    let second = cache.get_or_insert(key(&info, &user_data(Buffer::new(0x9000, 16, 8), false)));

    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);
}

#[test]
fn cache_miss_on_stride_change() {
    let info = layout();
    let mut cache = PermutationCache::new();

    let first = cache.get_or_insert(key(&info, &user_data(Buffer::new(0x1000, 16, 4), false)));
    let second = cache.get_or_insert(key(&info, &user_data(Buffer::new(0x1000, 32, 4), false)));

    assert_ne!(first, second);
    assert_eq!(second.index(), 1);
    assert_eq!(cache.len(), 2);
}

#[test]
fn cache_miss_on_sampler_change() {
    let info = layout();
    let mut cache = PermutationCache::new();

    let first = cache.get_or_insert(key(&info, &user_data(Buffer::new(0x1000, 16, 4), false)));
    let second = cache.get_or_insert(key(&info, &user_data(Buffer::new(0x1000, 16, 4), true)));

    assert_ne!(first, second);
}

#[test]
fn unbound_entry_serves_bound_candidate() {
    let info = layout();
    let mut cache = PermutationCache::new();

    let unbound = cache.insert(key(&info, &user_data(Buffer::null(), false)));
    let candidate = key(&info, &user_data(Buffer::new(0x1000, 16, 4), false));

    assert_eq!(cache.find(&candidate), Some(unbound));
}

#[test]
fn bound_entry_is_preferred_in_insertion_order() {
    let info = layout();
    let mut cache = PermutationCache::new();

    let bound = cache.insert(key(&info, &user_data(Buffer::new(0x1000, 16, 4), false)));
    cache.insert(key(&info, &user_data(Buffer::null(), false)));

    let candidate = key(&info, &user_data(Buffer::new(0x2000, 16, 64), false));
    assert_eq!(cache.find(&candidate), Some(bound));

    let other_stride = key(&info, &user_data(Buffer::new(0x2000, 8, 64), false));
    assert_eq!(cache.find(&other_stride).map(|id| id.index()), Some(1));
}

#[test]
fn keys_from_other_programs_never_match() {
    let mut a = ShaderInfo::new(Stage::Fragment, LogicalStage::Fragment);
    a.pgm_hash = 0xA;
    a.buffers.push(BufferResource::new(0));

    let mut b = ShaderInfo::new(Stage::Fragment, LogicalStage::Fragment);
    b.pgm_hash = 0xB;
    b.images.push(ImageResource::new(0));

    let mut cache = PermutationCache::new();
    cache.insert(key(&a, &UserData::new()));

    let mut ud = UserData::new();
    ud.write(0, &Image::new_2d(0x10_0000, 8, 8).to_dwords());
    let candidate = key(&b, &ud);
    assert!(cache.find(&candidate).is_none());

    let id = cache.get_or_insert(candidate);
    assert_eq!(id.index(), 1);
}

#[test]
fn separate_layouts_of_one_program_share_entries() {
    let first = layout();
    let second = layout();
    let mut cache = PermutationCache::new();

    let id = cache.insert(key(&first, &user_data(Buffer::new(0x1000, 16, 4), false)));
    let candidate = key(&second, &user_data(Buffer::new(0x1000, 16, 4), false));
    assert_eq!(cache.find(&candidate), Some(id));
}

// ============================================================================
// Insertion
// ============================================================================

#[test]
fn get_or_insert_with_runs_only_on_miss() {
    let info = layout();
    let mut cache = PermutationCache::new();
    let mut compiled = Vec::new();

    for stride in [16, 16, 32, 16] {
        let spec = key(&info, &user_data(Buffer::new(0x1000, stride, 4), false));
        cache.get_or_insert_with(spec, |id, spec| {
            compiled.push((id.index(), spec.buffers()[0].stride));
        });
    }

    assert_eq!(compiled, vec![(0, 16), (1, 32)]);
}

#[test]
fn clear_resets_ids() {
    let info = layout();
    let mut cache = PermutationCache::new();
    cache.insert(key(&info, &user_data(Buffer::new(0x1000, 16, 4), false)));
    cache.insert(key(&info, &user_data(Buffer::new(0x1000, 32, 4), false)));
    assert_eq!(cache.len(), 2);

    cache.clear();
    assert!(cache.is_empty());

    let id = cache.insert(key(&info, &user_data(Buffer::new(0x1000, 16, 4), false)));
    assert_eq!(id.index(), 0);
}
