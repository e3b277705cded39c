//! UUID utilities
//!
//! Ids are stored as hyphenated TEXT so rows stay readable from the sqlite shell.

use crate::{Error, Result};
use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse a stored id column back into a Uuid
pub fn parse_column(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| Error::Internal(format!("Corrupt id '{}' in database: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_roundtrips_generated_id() {
        let id = generate();
        assert_eq!(parse_column(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_parse_column_rejects_garbage() {
        assert!(matches!(parse_column("not-a-uuid"), Err(Error::Internal(_))));
    }
}
