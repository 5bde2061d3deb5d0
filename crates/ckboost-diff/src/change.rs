//! Per-field change records.

use serde::{Deserialize, Serialize};

/// The two compared values of one field and whether they differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange<T> {
    pub old_value: T,
    pub new_value: T,
    pub has_changed: bool,
}

impl<T: PartialEq> FieldChange<T> {
    /// Changed iff the values differ.
    pub fn compare(old_value: T, new_value: T) -> Self {
        let has_changed = old_value != new_value;
        Self {
            old_value,
            new_value,
            has_changed,
        }
    }
}

impl<T> FieldChange<T> {
    /// Use a caller-decided flag, for fields whose equality is not `==`.
    pub fn with_flag(old_value: T, new_value: T, has_changed: bool) -> Self {
        Self {
            old_value,
            new_value,
            has_changed,
        }
    }

    /// The same change viewed from the other side.
    pub fn reversed(self) -> Self {
        Self {
            old_value: self.new_value,
            new_value: self.old_value,
            has_changed: self.has_changed,
        }
    }

    /// The value to write if this change is applied.
    pub fn resolved(&self) -> &T {
        &self.new_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_and_reverse() {
        let change = FieldChange::compare(1u64, 2u64);
        assert!(change.has_changed);
        let back = change.reversed();
        assert_eq!((back.old_value, back.new_value), (2, 1));
        assert!(back.has_changed);
        assert!(!FieldChange::compare("a", "a").has_changed);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(FieldChange::compare(1u8, 1u8)).unwrap();
        assert_eq!(json["hasChanged"], false);
        assert_eq!(json["oldValue"], 1);
    }
}
