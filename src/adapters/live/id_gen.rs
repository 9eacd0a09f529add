//! Live adapter for the `IdGenerator` port.

use uuid::Uuid;

use crate::ports::IdGenerator;

/// Produces random v4 UUIDs for generated issue titles.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveIdGenerator;

impl IdGenerator for LiveIdGenerator {
    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::default_title;

    #[test]
    fn generated_titles_differ() {
        let first = default_title(None, &LiveIdGenerator);
        let second = default_title(None, &LiveIdGenerator);

        assert_ne!(first, second);
        assert_eq!(first.len(), "BugBuddy-".len() + 36);
    }
}
