//! Secret records fetched from a store.

/// A secret name and the value of its current version.
///
/// The value is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretRecord {
    /// Name as stored in the vault
    pub name: String,

    /// Current value
    pub value: String,
}

impl SecretRecord {
    /// Creates a new record.
    ///
    /// # Example
    ///
    /// ```
    /// use keyvault_export::SecretRecord;
    ///
    /// let record = SecretRecord::new("db-host", "10.0.0.5");
    /// assert_eq!(record.name, "db-host");
    /// assert!(!format!("{record:?}").contains("10.0.0.5"));
    /// ```
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRecord")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}
