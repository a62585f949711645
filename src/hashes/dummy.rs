use crate::registry::HashInstance;

/// Ignores its input and returns a fixed value.
#[derive(Clone, Copy, Debug, Default)]
pub struct DummyHash;

impl HashInstance for DummyHash {
    fn compute_hash(&self, data: &[u8]) -> Vec<u8> {
        std::hint::black_box(data);
        vec![0]
    }
}
