//! Content-hash memo for skipping regeneration on unchanged input.

use blake3::Hash;

/// Caches one value keyed by a blake3 fingerprint of its inputs. State is
/// explicit and owned by the caller; there is no ambient cache.
#[derive(Debug, Default)]
pub struct InputMemo<T> {
    state: Option<(Hash, T)>,
}

/// Fingerprint a sequence of input parts. Parts are length-prefixed before
/// hashing so `["ab", "c"]` and `["a", "bc"]` differ.
pub fn fingerprint(parts: &[&str]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hasher.finalize()
}

impl<T> InputMemo<T> {
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Returns the cached value only when the fingerprint matches.
    pub fn get(&self, key: &Hash) -> Option<&T> {
        match &self.state {
            Some((stored, value)) if stored == key => Some(value),
            _ => None,
        }
    }

    /// Replaces whatever was cached before.
    pub fn put(&mut self, key: Hash, value: T) {
        self.state = Some((key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_input_hits_the_memo() {
        let mut memo = InputMemo::new();
        let key = fingerprint(&["rust async", "simple"]);
        memo.put(key, vec!["q1".to_string()]);

        let again = fingerprint(&["rust async", "simple"]);
        assert_eq!(memo.get(&again), Some(&vec!["q1".to_string()]));
    }

    #[test]
    fn changed_input_misses() {
        let mut memo = InputMemo::new();
        memo.put(fingerprint(&["rust async", "simple"]), 1u8);

        assert!(memo.get(&fingerprint(&["rust async", "deep"])).is_none());
        assert!(memo.get(&fingerprint(&["rust sync", "simple"])).is_none());
    }

    #[test]
    fn part_boundaries_matter() {
        assert_ne!(fingerprint(&["ab", "c"]), fingerprint(&["a", "bc"]));
        assert_ne!(fingerprint(&["abc"]), fingerprint(&["ab", "c"]));
    }
}
