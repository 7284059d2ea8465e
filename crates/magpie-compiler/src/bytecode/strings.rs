//! String table shared by every function in a program.
//!
//! `PushString` refers to strings by index into this table. Identical
//! strings are stored once.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<String>,
    index: FxHashMap<String, u32>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or get an existing string, returns its index.
    pub fn add(&mut self, value: &str) -> u32 {
        if let Some(&idx) = self.index.get(value) {
            return idx;
        }

        let idx = self.strings.len() as u32;
        self.strings.push(value.to_owned());
        self.index.insert(value.to_owned(), idx);
        idx
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Strings in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates() {
        let mut table = StringTable::new();
        let a = table.add("hello");
        let b = table.add("world");
        let c = table.add("hello");

        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(b), Some("world"));
        assert_eq!(table.get(9), None);
        assert_eq!(table.iter().collect::<Vec<_>>(), vec!["hello", "world"]);
    }
}
