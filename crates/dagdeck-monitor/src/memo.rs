//! Render memoization keyed by node id.
//!
//! Large graphs redraw every tick. A node whose inputs equal those of the
//! previous frame reuses its rendered lines instead of deriving them again.
//! The structural hash is compared first; a match is confirmed against the
//! stored inputs, so two inputs that collide in the hash never share output.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Hash a render input.
pub fn structural_hash<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Whether a lookup produced fresh output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Cached,
    Rendered,
}

#[derive(Debug)]
struct Entry<K, T> {
    hash: u64,
    inputs: K,
    output: T,
}

/// Per-id cache of rendered output and the inputs it was rendered from.
#[derive(Debug)]
pub struct RenderCache<K, T> {
    entries: HashMap<String, Entry<K, T>>,
    hits: u64,
    misses: u64,
}

impl<K, T> Default for RenderCache<K, T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<K: Hash + PartialEq, T> RenderCache<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached output for `id` if `inputs` equal the stored ones,
    /// otherwise call `render` and cache its result with `inputs`.
    pub fn get_or_render<F>(&mut self, id: &str, inputs: K, render: F) -> (&T, RenderOutcome)
    where
        F: FnOnce() -> T,
    {
        let hash = structural_hash(&inputs);
        let unchanged = matches!(
            self.entries.get(id),
            Some(entry) if entry.hash == hash && entry.inputs == inputs
        );

        let outcome = if unchanged {
            self.hits += 1;
            RenderOutcome::Cached
        } else {
            self.misses += 1;
            let output = render();
            self.entries.insert(
                id.to_string(),
                Entry {
                    hash,
                    inputs,
                    output,
                },
            );
            RenderOutcome::Rendered
        };

        (&self.entries[id].output, outcome)
    }

    /// Drop entries whose id fails the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|id, _| keep(id));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Key whose hash ignores its value, so every pair of keys collides.
    #[derive(Debug, PartialEq)]
    struct Colliding(u32);

    impl Hash for Colliding {
        fn hash<H: Hasher>(&self, state: &mut H) {
            0u8.hash(state);
        }
    }

    #[test]
    fn test_equal_inputs_skip_render() {
        let mut cache = RenderCache::new();
        let mut renders = 0;

        for _ in 0..3 {
            let (out, _) = cache.get_or_render("a", ("orders".to_string(), 1u32), || {
                renders += 1;
                format!("render {renders}")
            });
            assert_eq!(out, "render 1");
        }
        assert_eq!(renders, 1);
        assert_eq!(cache.stats(), (2, 1));
    }

    #[test]
    fn test_changed_inputs_render_again() {
        let mut cache = RenderCache::new();
        let (_, first) = cache.get_or_render("a", 1u32, || "one");
        let (_, second) = cache.get_or_render("a", 2u32, || "two");
        let (out, third) = cache.get_or_render("a", 2u32, || "unused");

        assert_eq!(first, RenderOutcome::Rendered);
        assert_eq!(second, RenderOutcome::Rendered);
        assert_eq!(third, RenderOutcome::Cached);
        assert_eq!(*out, "two");
    }

    #[test]
    fn test_hash_collision_is_not_a_hit() {
        assert_eq!(structural_hash(&Colliding(1)), structural_hash(&Colliding(2)));

        let mut cache = RenderCache::new();
        cache.get_or_render("a", Colliding(1), || "one");
        let (out, outcome) = cache.get_or_render("a", Colliding(2), || "two");

        assert_eq!(outcome, RenderOutcome::Rendered);
        assert_eq!(*out, "two");

        let (_, outcome) = cache.get_or_render("a", Colliding(2), || "unused");
        assert_eq!(outcome, RenderOutcome::Cached);
    }

    #[test]
    fn test_ids_are_independent_and_prunable() {
        let mut cache = RenderCache::new();
        cache.get_or_render("a", 1u32, || 1);
        cache.get_or_render("b", 1u32, || 2);
        assert_eq!(cache.len(), 2);

        cache.retain(|id| id == "b");
        assert_eq!(cache.len(), 1);
        let (_, outcome) = cache.get_or_render("a", 1u32, || 3);
        assert_eq!(outcome, RenderOutcome::Rendered);
    }
}
