//! ID generation.

use ulid::Ulid;

/// Generates the ULID strings used as primary keys across devflow.
///
/// ULIDs sort lexicographically by creation time, which keeps `until_id` /
/// `since_id` pagination a plain string comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator;

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate a fresh ID, lowercased to match the rest of the API surface.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_lowercase_and_unique() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_ne!(id1, id2);
        assert_eq!(id1, id1.to_lowercase());
    }

    #[test]
    fn test_ids_sort_by_creation_time() {
        let id_gen = IdGenerator::new();
        let earlier = id_gen.generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let later = id_gen.generate();

        assert!(earlier < later);
    }
}
