//! Secret name selection and environment variable naming.

/// Prefix prepended to every exported environment variable.
pub const ENV_PREFIX: &str = "UR73FAC_";

/// Token that selects every secret in the vault.
pub const WILDCARD: &str = "*";

/// Which secrets a run should export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSelection {
    /// Every secret currently visible in the vault, in listing order.
    All,
    /// An explicit list, in input order. Duplicates are kept.
    Named(Vec<String>),
}

impl SecretSelection {
    /// Parses the raw `secret_names` input.
    ///
    /// # Example
    ///
    /// ```
    /// use keyvault_export::SecretSelection;
    ///
    /// assert_eq!(SecretSelection::parse(" * "), SecretSelection::All);
    /// assert_eq!(
    ///     SecretSelection::parse("a, b ,,c"),
    ///     SecretSelection::Named(vec!["a".into(), "b".into(), "c".into()])
    /// );
    /// ```
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == WILDCARD {
            return Self::All;
        }

        Self::Named(
            raw.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Returns true for wildcard mode.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Upper-cases `name` and replaces every character outside `[A-Z0-9_]` with `_`.
///
/// Upper-casing is Unicode-aware and happens first, so `ß` becomes `SS`.
/// Each remaining character becomes a single `_`, including characters
/// outside the Basic Multilingual Plane: `😀` maps to one `_`, not the two
/// a UTF-16 based replacement would produce. Key Vault names are limited to
/// `[0-9A-Za-z-]`, so this only matters for names supplied by hand.
///
/// Applying this twice gives the same result as applying it once. Distinct
/// names may map to the same identifier (`db-host` and `DB_HOST`).
///
/// # Example
///
/// ```
/// use keyvault_export::names::sanitize_env_name;
///
/// assert_eq!(sanitize_env_name("db-host"), "DB_HOST");
/// assert_eq!(sanitize_env_name("My.Key"), "MY_KEY");
/// ```
pub fn sanitize_env_name(name: &str) -> String {
    name.to_uppercase()
        .chars()
        .map(|c| {
            if c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Returns the prefixed environment variable name for a secret.
pub fn env_var_name(name: &str) -> String {
    format!("{}{}", ENV_PREFIX, sanitize_env_name(name))
}
