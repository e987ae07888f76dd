//! Invocation inputs and validated run configuration.

use crate::{ExportError, Result, SecretSelection};
use std::path::PathBuf;

/// Environment variable naming the file that propagates env vars to later steps.
pub const ENV_FILE_VAR: &str = "GITHUB_ENV";

/// Environment variable naming the file that collects step outputs.
pub const OUTPUT_FILE_VAR: &str = "GITHUB_OUTPUT";

/// Raw inputs as supplied by the caller.
///
/// Nothing here is validated; call [`Inputs::validate`] to obtain an
/// [`ExportConfig`].
#[derive(Clone, Default)]
pub struct Inputs {
    /// Service principal application id
    pub client_id: Option<String>,
    /// Service principal secret
    pub client_secret: Option<String>,
    /// Directory (tenant) id
    pub tenant_id: Option<String>,
    /// Short vault name
    pub keyvault_name: Option<String>,
    /// `*` or a comma separated list
    pub secret_names: Option<String>,
    /// Env propagation file
    pub env_file: Option<PathBuf>,
    /// Step output file
    pub output_file: Option<PathBuf>,
}

impl Inputs {
    /// Reads inputs from the runner environment.
    ///
    /// Each input `name` is looked up as `INPUT_<NAME>`, the sinks as
    /// [`ENV_FILE_VAR`] and [`OUTPUT_FILE_VAR`].
    pub fn from_env() -> Self {
        Self {
            client_id: input_var("client_id"),
            client_secret: input_var("client_secret"),
            tenant_id: input_var("tenant_id"),
            keyvault_name: input_var("keyvault_name"),
            secret_names: input_var("secret_names"),
            env_file: std::env::var_os(ENV_FILE_VAR).map(PathBuf::from),
            output_file: std::env::var_os(OUTPUT_FILE_VAR).map(PathBuf::from),
        }
    }

    /// Checks that every required input is present and not blank.
    ///
    /// Inputs are checked in declaration order and the first failure wins.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::MissingInput`] naming the first missing input.
    ///
    /// # Example
    ///
    /// ```
    /// use keyvault_export::Inputs;
    ///
    /// let inputs = Inputs {
    ///     client_id: Some("app".into()),
    ///     client_secret: Some("   ".into()),
    ///     ..Default::default()
    /// };
    /// let err = inputs.validate().unwrap_err();
    /// assert_eq!(err.to_string(), "Input required and not supplied: client_secret");
    /// ```
    pub fn validate(self) -> Result<ExportConfig> {
        let client_id = required("client_id", self.client_id)?;
        let client_secret = required("client_secret", self.client_secret)?;
        let tenant_id = required("tenant_id", self.tenant_id)?;
        let keyvault_name = required("keyvault_name", self.keyvault_name)?;
        let secret_names = required("secret_names", self.secret_names)?;

        Ok(ExportConfig {
            client_id,
            client_secret,
            tenant_id,
            keyvault_name,
            selection: SecretSelection::parse(&secret_names),
            env_file: self.env_file.filter(|path| !path.as_os_str().is_empty()),
            output_file: self.output_file.filter(|path| !path.as_os_str().is_empty()),
        })
    }
}

impl std::fmt::Debug for Inputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inputs")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("tenant_id", &self.tenant_id)
            .field("keyvault_name", &self.keyvault_name)
            .field("secret_names", &self.secret_names)
            .field("env_file", &self.env_file)
            .field("output_file", &self.output_file)
            .finish()
    }
}

fn input_var(name: &str) -> Option<String> {
    let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
    std::env::var(key).ok()
}

fn required(name: &str, value: Option<String>) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ExportError::MissingInput(name.to_string()))
}

/// Validated configuration for one export run.
///
/// ```
/// use keyvault_export::{ExportConfig, SecretSelection};
///
/// let config = ExportConfig::new("tenant", "app", "secret", "myvault", "/tmp/env")
///     .with_selection(SecretSelection::All);
/// assert_eq!(config.vault_url(), "https://myvault.vault.azure.net");
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// Service principal application id
    pub client_id: String,
    /// Service principal secret
    pub client_secret: String,
    /// Directory (tenant) id
    pub tenant_id: String,
    /// Short vault name, not validated
    pub keyvault_name: String,
    /// Secrets to export
    pub selection: SecretSelection,
    /// Env propagation file; only required once a line is written
    pub env_file: Option<PathBuf>,
    /// Step output file; the legacy output command is used when absent
    pub output_file: Option<PathBuf>,
}

impl ExportConfig {
    /// Creates a configuration that exports nothing until a selection is set.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        keyvault_name: impl Into<String>,
        env_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tenant_id: tenant_id.into(),
            keyvault_name: keyvault_name.into(),
            selection: SecretSelection::Named(Vec::new()),
            env_file: Some(env_file.into()),
            output_file: None,
        }
    }

    /// Sets which secrets to export.
    pub fn with_selection(mut self, selection: SecretSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the step output file.
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Returns the vault endpoint derived from the vault name.
    pub fn vault_url(&self) -> String {
        format!("https://{}.vault.azure.net", self.keyvault_name)
    }
}

impl std::fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .field("keyvault_name", &self.keyvault_name)
            .field("selection", &self.selection)
            .field("env_file", &self.env_file)
            .field("output_file", &self.output_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn complete() -> Inputs {
        Inputs {
            client_id: Some("app-id".into()),
            client_secret: Some("s3cret".into()),
            tenant_id: Some("tenant".into()),
            keyvault_name: Some("myvault".into()),
            secret_names: Some(" a, b ".into()),
            env_file: Some(PathBuf::from("/tmp/env")),
            output_file: None,
        }
    }

    #[test]
    fn test_validate_complete() {
        let config = complete().validate().unwrap();
        assert_eq!(config.client_id, "app-id");
        assert_eq!(config.vault_url(), "https://myvault.vault.azure.net");
        assert_eq!(
            config.selection,
            SecretSelection::Named(vec!["a".into(), "b".into()])
        );
        assert!(config.output_file.is_none());
    }

    #[test]
    fn test_each_required_input() {
        let cases: [(&str, fn(&mut Inputs)); 5] = [
            ("client_id", |i| i.client_id = None),
            ("client_secret", |i| i.client_secret = Some(String::new())),
            ("tenant_id", |i| i.tenant_id = Some("  ".into())),
            ("keyvault_name", |i| i.keyvault_name = None),
            ("secret_names", |i| i.secret_names = Some("\t".into())),
        ];

        for (name, clear) in cases {
            let mut inputs = complete();
            clear(&mut inputs);
            let err = inputs.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration);
            assert!(err.to_string().ends_with(name), "unexpected error: {err}");
        }
    }

    #[test]
    fn test_env_file_is_optional_at_validation() {
        let mut inputs = complete();
        inputs.env_file = Some(PathBuf::new());
        let config = inputs.validate().unwrap();
        assert!(config.env_file.is_none());
    }

    #[test]
    fn test_first_missing_input_wins() {
        let err = Inputs::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "Input required and not supplied: client_id");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let inputs = complete();
        assert!(!format!("{inputs:?}").contains("s3cret"));
        let config = inputs.validate().unwrap();
        assert!(!format!("{config:?}").contains("s3cret"));
    }

    #[test]
    fn test_builder() {
        let config = ExportConfig::new("t", "c", "s", "kv", "/tmp/env")
            .with_selection(SecretSelection::All)
            .with_output_file("/tmp/out");
        assert!(config.selection.is_all());
        assert_eq!(config.output_file, Some(PathBuf::from("/tmp/out")));
    }
}
