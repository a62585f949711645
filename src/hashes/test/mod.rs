use super::*;

#[test]
fn test_fnv1a_32_known_values() {
    let fnv = Fnv1a32::new(0);
    assert_eq!(fnv.hash(b""), 0x811c_9dc5);
    assert_eq!(fnv.hash(b"a"), 0xe40c_292c);
    assert_eq!(fnv.hash(b"foobar"), 0xbf9c_f968);
}

#[test]
fn test_fnv1a_64_known_values() {
    let fnv = Fnv1a64::new(0);
    assert_eq!(fnv.hash(b""), 0xcbf2_9ce4_8422_2325);
    assert_eq!(fnv.hash(b"a"), 0xaf63_dc4c_8601_ec8c);
    assert_eq!(fnv.hash(b"foobar"), 0x8594_4171_f739_67e8);
}

#[test]
fn test_murmur3_known_values() {
    assert_eq!(Murmur3x86_32::new(0).hash(b""), 0);
    assert_eq!(Murmur3x86_32::new(1).hash(b""), 0x514e_28b7);
    assert_eq!(Murmur3x86_32::new(0xffff_ffff).hash(b""), 0x81f1_6f39);
    assert_eq!(Murmur3x86_32::new(0).hash(&[0, 0, 0, 0]), 0x2362_f9de);
    assert_eq!(Murmur3x86_32::new(0x9747_b28c).hash(b"aaaa"), 0x5a97_808a);
    assert_eq!(
        Murmur3x86_32::new(0x9747_b28c).hash(b"The quick brown fox jumps over the lazy dog"),
        0x2fa8_26cd
    );
}

#[test]
fn test_dummy_is_constant() {
    let a = DummyHash.compute_hash(b"one input");
    let b = DummyHash.compute_hash(b"a completely different input");
    assert_eq!(a, b);
}

#[test]
fn test_seed_changes_output() {
    let data = b"seeded hashes must differ per seed";
    for case in available_cases() {
        if case.name == "DummyHash" {
            continue;
        }
        let a = case.instantiate(0).compute_hash(data);
        let b = case.instantiate(1).compute_hash(data);
        assert_ne!(a, b, "case {} ignores its seed", case.name);
    }
}

#[test]
fn test_digest_lengths() {
    assert_eq!(Sha256Hash::new(0).compute_hash(b"abc").len(), 32);
    assert_eq!(Sha3Hash::new(0).compute_hash(b"abc").len(), 32);
}

#[test]
fn test_empty_input_is_accepted() {
    for case in available_cases() {
        let _ = case.instantiate(3).compute_hash(&[]);
    }
}
