//! Hash registry for dynamic benchmark case discovery.
//!
//! A benchmark case pairs a display name with a factory that builds a
//! seeded hash instance. The registry is built once at startup and handed
//! to the runner as an immutable, ordered list.

/// A hash function ready to be timed.
///
/// `compute_hash` must be deterministic for a given instance and have no
/// observable side effects beyond its return value.
pub trait HashInstance {
    fn compute_hash(&self, data: &[u8]) -> Vec<u8>;
}

/// Builds a hash instance from a 32-bit seed.
pub type HashFactory = fn(u32) -> Box<dyn HashInstance>;

/// A named hash factory.
#[derive(Clone, Copy)]
pub struct BenchmarkCase {
    /// Unique identifier for this case (e.g., "FNV-1a-32")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    pub factory: HashFactory,
}

impl BenchmarkCase {
    pub fn new(name: &'static str, description: &'static str, factory: HashFactory) -> Self {
        Self {
            name,
            description,
            factory,
        }
    }

    /// Build an instance for `seed`.
    pub fn instantiate(&self, seed: u32) -> Box<dyn HashInstance> {
        (self.factory)(seed)
    }
}

impl std::fmt::Debug for BenchmarkCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkCase")
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered list of benchmark cases
#[derive(Debug, Default)]
pub struct HashRegistry {
    cases: Vec<BenchmarkCase>,
}

impl HashRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { cases: Vec::new() }
    }

    /// Register a case
    pub fn register(&mut self, case: BenchmarkCase) {
        self.cases.push(case);
    }

    /// Get all registered cases, in registration order
    pub fn all(&self) -> &[BenchmarkCase] {
        &self.cases
    }

    /// Find case by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&BenchmarkCase> {
        self.cases.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// List case names
    pub fn list_names(&self) -> Vec<&'static str> {
        self.cases.iter().map(|c| c.name).collect()
    }
}

/// Build the default registry with all hashes
pub fn build_registry() -> HashRegistry {
    let mut registry = HashRegistry::new();

    for case in crate::hashes::available_cases() {
        registry.register(case);
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_names_unique() {
        let registry = build_registry();
        let mut names = registry.list_names();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert!(!registry.all().is_empty());
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let registry = build_registry();
        assert_eq!(registry.find("dummyhash").map(|c| c.name), Some("DummyHash"));
        assert!(registry.find("no-such-hash").is_none());
    }

    #[test]
    fn test_every_case_is_deterministic_per_seed() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        for case in build_registry().all() {
            let a = case.instantiate(17).compute_hash(&data);
            let b = case.instantiate(17).compute_hash(&data);
            assert_eq!(a, b, "case {} should be deterministic", case.name);
        }
    }
}
