//! CI runner reporting channel.
//!
//! The runner reads workflow commands from the step's standard output and
//! picks up environment variables and outputs from files whose paths it
//! passes in through `GITHUB_ENV` and `GITHUB_OUTPUT`. [`Runner`] writes both.

use crate::config::ENV_FILE_VAR;
use crate::{ExportError, Inputs, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::AsyncWriteExt;

/// Writes workflow commands and runner files for one step.
pub struct Runner {
    commands: Box<dyn Write + Send>,
    env_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    failed: bool,
}

impl Runner {
    /// Creates a runner channel for the sink paths named in `inputs`.
    ///
    /// A missing env file path is only an error once a line has to be
    /// appended, so a run that exports nothing succeeds without one.
    pub fn for_inputs(inputs: &Inputs, commands: impl Write + Send + 'static) -> Self {
        Self {
            commands: Box::new(commands),
            env_file: non_empty(inputs.env_file.clone()),
            output_file: non_empty(inputs.output_file.clone()),
            failed: false,
        }
    }

    /// Creates a runner channel from explicit sink paths.
    pub fn from_parts(
        env_file: impl Into<PathBuf>,
        output_file: Option<PathBuf>,
        commands: impl Write + Send + 'static,
    ) -> Self {
        Self {
            commands: Box::new(commands),
            env_file: Some(env_file.into()),
            output_file,
            failed: false,
        }
    }

    /// Writes a plain log line.
    pub fn info(&mut self, message: &str) -> Result<()> {
        self.write_line(message)
    }

    /// Writes a warning annotation.
    pub fn warning(&mut self, message: &str) -> Result<()> {
        self.command("warning", &[], message)
    }

    /// Registers `value` with the runner's log masking, one line at a time.
    pub fn add_mask(&mut self, value: &str) -> Result<()> {
        for line in value.lines().filter(|line| !line.trim().is_empty()) {
            self.command("add-mask", &[], line)?;
        }
        Ok(())
    }

    /// Publishes a step output named `name`.
    ///
    /// With an output file the value is appended in heredoc form under a
    /// random delimiter; otherwise the legacy `set-output` command is used.
    pub async fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        match self.output_file.clone() {
            Some(path) => {
                let entry = heredoc_entry(name, value)?;
                append(&path, &entry).await
            }
            None => {
                self.write_line("")?;
                self.command("set-output", &[("name", name)], value)
            }
        }
    }

    /// Appends `key=value` to the environment file.
    ///
    /// The file is opened in append mode for every call, so each line is
    /// visible to later steps even if the run stops afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::MissingInput`] naming [`ENV_FILE_VAR`] when no
    /// env file was configured.
    pub async fn export_env_line(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self
            .env_file
            .as_deref()
            .ok_or_else(|| ExportError::MissingInput(ENV_FILE_VAR.to_string()))?;
        let line = format!("{key}={value}\n");
        append(path, &line).await
    }

    /// Marks the step as failed and writes an error annotation.
    ///
    /// Write failures are logged rather than returned, since this is the
    /// last thing a failing run does.
    pub fn set_failed(&mut self, message: &str) {
        self.failed = true;
        if let Err(e) = self.command("error", &[], message) {
            tracing::error!(error = %e, "failed to report step failure");
        }
    }

    /// Returns true once [`set_failed`](Self::set_failed) has been called.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    fn command(&mut self, name: &str, properties: &[(&str, &str)], message: &str) -> Result<()> {
        let mut line = format!("::{name}");
        if !properties.is_empty() {
            let props: Vec<String> = properties
                .iter()
                .map(|(key, value)| format!("{key}={}", escape_property(value)))
                .collect();
            line.push(' ');
            line.push_str(&props.join(","));
        }
        line.push_str("::");
        line.push_str(&escape_data(message));
        self.write_line(&line)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.commands, "{line}")
            .and_then(|()| self.commands.flush())
            .map_err(|e| ExportError::sink("<workflow commands>", e))
    }
}

fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|path| !path.as_os_str().is_empty())
}

async fn append(path: &Path, content: &str) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| ExportError::sink(path, e))?;

    file.write_all(content.as_bytes())
        .await
        .map_err(|e| ExportError::sink(path, e))?;
    file.flush().await.map_err(|e| ExportError::sink(path, e))
}

fn heredoc_entry(name: &str, value: &str) -> Result<String> {
    let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());

    if name.contains(&delimiter) {
        return Err(ExportError::Other(anyhow::anyhow!(
            "Unexpected input: name should not contain the delimiter \"{delimiter}\""
        )));
    }
    if value.contains(&delimiter) {
        return Err(ExportError::Other(anyhow::anyhow!(
            "Unexpected input: value should not contain the delimiter \"{delimiter}\""
        )));
    }

    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

/// In-memory command stream that can be read back after a run.
///
/// Clones share the same buffer.
#[derive(Clone, Default)]
pub struct CapturedCommands(Arc<Mutex<Vec<u8>>>);

impl CapturedCommands {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far.
    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Write for CapturedCommands {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        let mut buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use tempfile::TempDir;

    fn runner(dir: &TempDir, with_output_file: bool) -> (Runner, CapturedCommands) {
        let commands = CapturedCommands::new();
        let output_file = with_output_file.then(|| dir.path().join("output"));
        let runner = Runner::from_parts(dir.path().join("env"), output_file, commands.clone());
        (runner, commands)
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_data("50%\r\nnext"), "50%25%0D%0Anext");
        assert_eq!(escape_property("a:b,c"), "a%3Ab%2Cc");
    }

    #[test]
    fn test_log_commands() {
        let dir = TempDir::new().unwrap();
        let (mut runner, commands) = runner(&dir, false);

        runner.info("hello").unwrap();
        runner.warning("careful\nnow").unwrap();
        assert!(!runner.is_failed());
        runner.set_failed("broken");

        assert_eq!(commands.contents(), "hello\n::warning::careful%0Anow\n::error::broken\n");
        assert!(runner.is_failed());
    }

    #[test]
    fn test_add_mask_per_line() {
        let dir = TempDir::new().unwrap();
        let (mut runner, commands) = runner(&dir, false);

        runner.add_mask("line1\n\nline2").unwrap();
        assert_eq!(commands.contents(), "::add-mask::line1\n::add-mask::line2\n");
    }

    #[tokio::test]
    async fn test_env_lines_append() {
        let dir = TempDir::new().unwrap();
        let (mut runner, _) = runner(&dir, false);
        std::fs::write(dir.path().join("env"), "EXISTING=1\n").unwrap();

        runner.export_env_line("UR73FAC_A", "x").await.unwrap();
        runner.export_env_line("UR73FAC_B", "y").await.unwrap();

        let env = std::fs::read_to_string(dir.path().join("env")).unwrap();
        assert_eq!(env, "EXISTING=1\nUR73FAC_A=x\nUR73FAC_B=y\n");
    }

    #[tokio::test]
    async fn test_set_output_heredoc() {
        let dir = TempDir::new().unwrap();
        let (mut runner, commands) = runner(&dir, true);

        runner.set_output("db-host", "10.0.0.5").await.unwrap();

        let output = std::fs::read_to_string(dir.path().join("output")).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        let delimiter = lines[0].strip_prefix("db-host<<").unwrap();
        assert!(delimiter.starts_with("ghadelimiter_"));
        assert_eq!(lines[1], "10.0.0.5");
        assert_eq!(lines[2], delimiter);
        assert!(commands.contents().is_empty());
    }

    #[tokio::test]
    async fn test_set_output_legacy_command() {
        let dir = TempDir::new().unwrap();
        let (mut runner, commands) = runner(&dir, false);

        runner.set_output("a,b", "v").await.unwrap();
        assert_eq!(commands.contents(), "\n::set-output name=a%2Cb::v\n");
    }

    #[tokio::test]
    async fn test_unwritable_env_file() {
        let dir = TempDir::new().unwrap();
        let mut runner = Runner::from_parts(
            dir.path().join("missing").join("env"),
            None,
            CapturedCommands::new(),
        );

        let err = runner.export_env_line("K", "v").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Sink);
    }

    #[tokio::test]
    async fn test_env_line_without_env_file() {
        let mut runner = Runner::for_inputs(&Inputs::default(), CapturedCommands::new());

        let err = runner.export_env_line("K", "v").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.to_string(), "Input required and not supplied: GITHUB_ENV");
    }
}
