use std::collections::HashSet;

/// Keys confirmed absent from the backend during this session.
///
/// Unbounded and never expires on its own; only `clear` (explicit cache
/// clear or a language switch) lets a key be requested again.
#[derive(Debug, Default)]
pub struct NegativeKeyRegistry {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl NegativeKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Record a key as absent. Returns `false` if it was already known.
    pub fn add(&mut self, key: &str) -> bool {
        if !self.seen.insert(key.to_string()) {
            return false;
        }
        self.order.push(key.to_string());
        true
    }

    /// All known-absent keys in the order they were first recorded.
    pub fn all(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
