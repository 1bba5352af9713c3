use std::collections::HashMap;

/// Deduplicating string store. Equal strings always intern to the same index.
#[derive(Debug, Default, Clone)]
pub struct StringPool {
    strings: Vec<String>,
    index: HashMap<String, usize>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `s`, storing it first if unseen.
    pub fn intern(&mut self, s: &str) -> usize {
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.strings.len();
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), idx);
        idx
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.strings.get(idx).map(String::as_str)
    }

    /// Index of an already interned string.
    pub fn lookup(&self, s: &str) -> Option<usize> {
        self.index.get(s).copied()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[test]
fn test_intern_deduplicates() {
    let mut pool = StringPool::new();
    let a = pool.intern("0_string");
    let b = pool.intern("2_string");
    assert_eq!(pool.intern("0_string"), a);
    assert_ne!(a, b);
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.get(b), Some("2_string"));
    assert_eq!(pool.lookup("missing"), None);
}
