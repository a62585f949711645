use crate::registry::HashInstance;

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;
const FNV64_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV64_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a, 32-bit. The seed is folded into the offset basis.
#[derive(Clone, Copy, Debug)]
pub struct Fnv1a32 {
    basis: u32,
}

impl Fnv1a32 {
    pub fn new(seed: u32) -> Self {
        Self {
            basis: FNV32_OFFSET_BASIS ^ seed,
        }
    }

    pub fn hash(&self, data: &[u8]) -> u32 {
        data.iter().fold(self.basis, |hash, &byte| {
            (hash ^ byte as u32).wrapping_mul(FNV32_PRIME)
        })
    }
}

impl HashInstance for Fnv1a32 {
    fn compute_hash(&self, data: &[u8]) -> Vec<u8> {
        self.hash(data).to_le_bytes().to_vec()
    }
}

/// FNV-1a, 64-bit. The seed is folded into the offset basis.
#[derive(Clone, Copy, Debug)]
pub struct Fnv1a64 {
    basis: u64,
}

impl Fnv1a64 {
    pub fn new(seed: u32) -> Self {
        Self {
            basis: FNV64_OFFSET_BASIS ^ seed as u64,
        }
    }

    pub fn hash(&self, data: &[u8]) -> u64 {
        data.iter().fold(self.basis, |hash, &byte| {
            (hash ^ byte as u64).wrapping_mul(FNV64_PRIME)
        })
    }
}

impl HashInstance for Fnv1a64 {
    fn compute_hash(&self, data: &[u8]) -> Vec<u8> {
        self.hash(data).to_le_bytes().to_vec()
    }
}
