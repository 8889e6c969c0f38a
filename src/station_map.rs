use std::{
    borrow::Borrow,
    hash::{BuildHasher, Hasher},
};

use crate::{
    config::Config,
    mmap_allocator::{AllocatorOptions, MmapAllocator},
    temperature_summary::TemperatureSummary,
};

/// A borrowed station name, as it appears in the input.
///
/// Lets a chunk look up `&[u8]` slices of the mapped file against owned
/// `StationNameKey`s without allocating.
#[repr(transparent)]
pub struct StationNameKeyView {
    name: [u8],
}

impl StationNameKeyView {
    pub fn new(s: &[u8]) -> &Self {
        // Sound because of repr(transparent): same layout and metadata as [u8].
        unsafe { &*(s as *const [u8] as *const StationNameKeyView) }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.name
    }

    pub fn hash_u64(&self) -> u64 {
        hash64(&self.name)
    }
}

// Taken from FxHash implementation.
const SEED: u64 = 0xf1357aea2e62a9c5;

#[inline(always)]
fn mix(hash: u64, word: u64) -> u64 {
    hash.wrapping_add(word).wrapping_mul(SEED)
}

/// FxHash-style hash of a whole station name, eight bytes at a time.
#[cfg_attr(feature = "profiled", inline(never))]
pub fn hash64(bytes: &[u8]) -> u64 {
    let mut hash = mix(0, bytes.len() as u64);
    let mut words = bytes.chunks_exact(8);
    for word in &mut words {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(word);
        hash = mix(hash, u64::from_le_bytes(buf));
    }
    let tail = words.remainder();
    if !tail.is_empty() {
        let mut buf = [0u8; 8];
        buf[..tail.len()].copy_from_slice(tail);
        hash = mix(hash, u64::from_le_bytes(buf));
    }
    hash.rotate_left(26)
}

impl Borrow<StationNameKeyView> for StationNameKey {
    fn borrow(&self) -> &StationNameKeyView {
        StationNameKeyView::new(&self.name)
    }
}

impl PartialEq for StationNameKeyView {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for StationNameKeyView {}

impl std::hash::Hash for StationNameKeyView {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_u64());
    }
}

/// An owned copy of a station name; made once per station per chunk.
#[derive(Clone, Debug)]
pub struct StationNameKey {
    name: Box<[u8]>,
}

impl StationNameKey {
    pub fn new(name: &[u8]) -> Self {
        StationNameKey { name: name.into() }
    }

    pub fn view(&self) -> &StationNameKeyView {
        self.borrow()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.name
    }

    pub fn into_bytes(self) -> Box<[u8]> {
        self.name
    }
}

impl PartialEq for StationNameKey {
    fn eq(&self, other: &Self) -> bool {
        self.view() == other.view()
    }
}

impl Eq for StationNameKey {}

impl std::hash::Hash for StationNameKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.view().hash(state);
    }
}

/// Passes through the single precomputed `hash64` value.
#[derive(Default)]
pub struct NopHasher(u64);

impl Hasher for NopHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write_u64(&mut self, i: u64) {
        debug_assert!(self.0 == 0);
        self.0 = i;
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0 = hash64(bytes);
    }
}

#[derive(Clone, Default)]
pub struct NopHasherBuilder {}

impl BuildHasher for NopHasherBuilder {
    type Hasher = NopHasher;
    fn build_hasher(&self) -> Self::Hasher {
        NopHasher::default()
    }
}

pub type StationMap<V> = hashbrown::HashMap<StationNameKey, V, NopHasherBuilder, MmapAllocator>;

/// Station name to running aggregate, one per chunk plus the merged result.
pub type StationTable = StationMap<TemperatureSummary>;

pub struct StationMapOptions {
    pub request_hugepage: bool,
    pub capacity: usize,
}

impl From<&Config> for StationMapOptions {
    fn from(config: &Config) -> Self {
        StationMapOptions {
            request_hugepage: config.request_hugepage,
            capacity: config.table_capacity,
        }
    }
}

pub fn new_station_map<V>(opts: &StationMapOptions) -> StationMap<V> {
    StationMap::<V>::with_capacity_and_hasher_in(
        opts.capacity,
        NopHasherBuilder::default(),
        MmapAllocator::new(&AllocatorOptions {
            request_hugepage: opts.request_hugepage,
        }),
    )
}
