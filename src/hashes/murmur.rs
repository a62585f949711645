use crate::registry::HashInstance;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// MurmurHash3, x86 32-bit variant.
#[derive(Clone, Copy, Debug)]
pub struct Murmur3x86_32 {
    seed: u32,
}

#[inline(always)]
fn mix_k1(k1: u32) -> u32 {
    k1.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

#[inline(always)]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

impl Murmur3x86_32 {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn hash(&self, data: &[u8]) -> u32 {
        let mut h1 = self.seed;
        let mut blocks = data.chunks_exact(4);

        for block in &mut blocks {
            let k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
            h1 ^= mix_k1(k1);
            h1 = h1.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
        }

        let tail = blocks.remainder();
        if !tail.is_empty() {
            let k1 = tail
                .iter()
                .rev()
                .fold(0u32, |acc, &byte| (acc << 8) | byte as u32);
            h1 ^= mix_k1(k1);
        }

        fmix32(h1 ^ data.len() as u32)
    }
}

impl HashInstance for Murmur3x86_32 {
    fn compute_hash(&self, data: &[u8]) -> Vec<u8> {
        self.hash(data).to_le_bytes().to_vec()
    }
}
