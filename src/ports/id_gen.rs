//! ID generator port used for generated issue titles.

/// Produces unique identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier.
    fn generate_id(&self) -> String;
}
