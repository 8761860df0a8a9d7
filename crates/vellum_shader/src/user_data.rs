//! Per-Dispatch User Data
//!
//! Sharps are not part of a shader's static layout: they are read at dispatch
//! time from the 16 user SGPRs, from the "flattened" user-data buffer that
//! extends them, or from guest memory through a pointer held in user data.
//!
//! [`UserData`] is a snapshot of that state. A descriptor addresses its sharp
//! by a *user-data dword index*: indices below [`NUM_USER_SGPRS`] read SGPRs,
//! higher indices continue into the flattened buffer.

use bytemuck::Pod;
use smallvec::SmallVec;

/// Number of user SGPRs a stage receives.
pub const NUM_USER_SGPRS: usize = 16;

// ─── Guest Memory ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct MappedRegion {
    base: u64,
    bytes: Vec<u8>,
}

impl MappedRegion {
    fn slice(&self, addr: u64, len: usize) -> Option<&[u8]> {
        let offset = usize::try_from(addr.checked_sub(self.base)?).ok()?;
        self.bytes.get(offset..offset.checked_add(len)?)
    }
}

/// Readable windows of guest memory captured alongside the user data.
#[derive(Debug, Clone, Default)]
pub struct GuestMemory {
    regions: SmallVec<[MappedRegion; 4]>,
}

impl GuestMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `bytes` at guest address `base`. Later mappings shadow earlier ones.
    pub fn map(&mut self, base: u64, bytes: Vec<u8>) {
        self.regions.insert(0, MappedRegion { base, bytes });
    }

    /// Maps a dword slice at guest address `base`.
    pub fn map_dwords(&mut self, base: u64, dwords: &[u32]) {
        self.map(base, bytemuck::cast_slice(dwords).to_vec());
    }

    /// Reads a `T` at `addr`. Fails when the range is not fully inside one mapping.
    #[must_use]
    pub fn read<T: Pod>(&self, addr: u64) -> Option<T> {
        let len = std::mem::size_of::<T>();
        self.regions
            .iter()
            .find_map(|region| region.slice(addr, len))
            .map(bytemuck::pod_read_unaligned)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

// ─── User Data ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct UserData {
    sgprs: [u32; NUM_USER_SGPRS],
    flattened: Vec<u32>,
    memory: GuestMemory,
}

impl UserData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `values` into consecutive user-data dwords starting at `index`,
    /// growing the flattened buffer as needed.
    pub fn write(&mut self, index: usize, values: &[u32]) {
        for (i, &value) in values.iter().enumerate() {
            let slot = index + i;
            if slot < NUM_USER_SGPRS {
                self.sgprs[slot] = value;
            } else {
                let flat = slot - NUM_USER_SGPRS;
                if flat >= self.flattened.len() {
                    self.flattened.resize(flat + 1, 0);
                }
                self.flattened[flat] = value;
            }
        }
    }

    /// Writes a 64-bit guest pointer into the SGPR pair at `sgpr_base`.
    pub fn write_pointer(&mut self, sgpr_base: usize, addr: u64) {
        self.write(sgpr_base, &[addr as u32, (addr >> 32) as u32]);
    }

    #[must_use]
    pub fn sgprs(&self) -> &[u32; NUM_USER_SGPRS] {
        &self.sgprs
    }

    #[must_use]
    pub fn memory(&self) -> &GuestMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut GuestMemory {
        &mut self.memory
    }

    /// Reads one user-data dword; `None` past the end of the flattened buffer.
    #[must_use]
    pub fn dword(&self, index: usize) -> Option<u32> {
        if index < NUM_USER_SGPRS {
            Some(self.sgprs[index])
        } else {
            self.flattened.get(index - NUM_USER_SGPRS).copied()
        }
    }

    /// Reads `N` consecutive user-data dwords starting at `index`.
    #[must_use]
    pub fn read_dwords<const N: usize>(&self, index: usize) -> Option<[u32; N]> {
        let mut out = [0u32; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.dword(index.checked_add(i)?)?;
        }
        Some(out)
    }

    /// Reads the 64-bit guest pointer held in the SGPR pair at `sgpr_base`.
    #[must_use]
    pub fn read_pointer(&self, sgpr_base: usize) -> Option<u64> {
        let [lo, hi] = self.read_dwords::<2>(sgpr_base)?;
        Some(u64::from(lo) | (u64::from(hi) << 32))
    }

    /// Reads `N` dwords from guest memory at `dword_offset` dwords past the
    /// pointer held in the SGPR pair at `sgpr_base`.
    #[must_use]
    pub fn read_indirect<const N: usize>(
        &self,
        sgpr_base: usize,
        dword_offset: usize,
    ) -> Option<[u32; N]>
    where
        [u32; N]: Pod,
    {
        let base = self.read_pointer(sgpr_base)?;
        let addr = base.checked_add(u64::try_from(dword_offset).ok()? * 4)?;
        self.memory.read::<[u32; N]>(addr)
    }
}
