/// FNV-1a style mix of a seed with a string key.
pub(crate) fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Seed for the `index`-th top-level instance of a build.
pub(crate) fn hash_instance_seed(build_seed: u64, index: u64) -> u64 {
    let hash = build_seed ^ index.wrapping_mul(0x9e3779b97f4a7c15);
    hash.wrapping_mul(0x100000001b3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_and_indices_spread_seeds() {
        assert_ne!(hash_seed(7, "en"), hash_seed(7, "fr-FR"));
        assert_eq!(hash_seed(7, "en"), hash_seed(7, "en"));
        assert_ne!(hash_instance_seed(7, 0), hash_instance_seed(7, 1));
    }
}
