use super::{MetricScores, timed};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("Could not parse output of '{program}': {reason}")]
    Parse { program: String, reason: String },
    #[error("Failed to read output file '{path}': {source}")]
    OutputFile {
        path: String,
        source: std::io::Error,
    },
}

/// A command line tool invoked once per call, blocking until it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    program: PathBuf,
}

impl ExternalTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn display_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Runs the tool with `args` and returns its standard output.
    ///
    /// A non-zero exit status is an error carrying the tool's standard error.
    pub fn run<I, S>(&self, args: I) -> Result<String, ToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command.args(args);
        self.execute(command)
    }

    fn execute(&self, mut command: Command) -> Result<String, ToolError> {
        trace!(command = ?command, "Running external tool");
        let output = command.output().map_err(|e| ToolError::Spawn {
            program: self.display_name(),
            source: e,
        })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                program: self.display_name(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub(crate) fn parse_error(&self, reason: impl Into<String>) -> ToolError {
        ToolError::Parse {
            program: self.display_name(),
            reason: reason.into(),
        }
    }

    /// Parses `token` as a float, attributing failures to this tool.
    pub fn parse_float(&self, token: &str) -> Result<f64, ToolError> {
        token
            .trim()
            .parse::<f64>()
            .map_err(|_| self.parse_error(format!("'{}' is not a number", token.trim())))
    }

    /// The last whitespace-separated token of `output`, as a float.
    pub fn last_token(&self, output: &str) -> Result<f64, ToolError> {
        let token = output
            .split_whitespace()
            .last()
            .ok_or_else(|| self.parse_error("empty output"))?;
        self.parse_float(token)
    }

    /// The first `n` whitespace-separated tokens of `output`, as floats.
    pub fn leading_tokens(&self, output: &str, n: usize) -> Result<Vec<f64>, ToolError> {
        let tokens: Vec<&str> = output.split_whitespace().take(n).collect();
        if tokens.len() < n {
            return Err(self.parse_error(format!(
                "expected {} values, found {}",
                n,
                tokens.len()
            )));
        }
        tokens.into_iter().map(|t| self.parse_float(t)).collect()
    }
}

/// Runs one tool call producing `names` and turns the outcome into scores.
///
/// A failed call yields NaN for every name; the failure is only logged at debug level.
pub(crate) fn score_call(
    plugin: &str,
    names: &[&str],
    call: impl FnOnce() -> Result<Vec<f64>, ToolError>,
) -> MetricScores {
    let (result, elapsed) = timed(call);
    match result {
        Ok(values) => MetricScores::from_shared_call(names, &values, elapsed),
        Err(e) => {
            debug!(metric = plugin, error = %e, "Sub-metric computation failed");
            MetricScores::failed(names, elapsed)
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};

    /// Writes an executable shell script standing in for an external tool.
    #[cfg(unix)]
    pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    pub fn touch_pdb(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "END\n").unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_token_parses_trailing_number() {
        let tool = ExternalTool::new("dfire");
        assert_eq!(tool.last_token("Energy of model.pdb  -1234.5\n").unwrap(), -1234.5);
    }

    #[test]
    fn last_token_of_empty_output_is_a_parse_error() {
        let tool = ExternalTool::new("dfire");
        assert!(matches!(tool.last_token("  \n"), Err(ToolError::Parse { .. })));
    }

    #[test]
    fn leading_tokens_requires_enough_values() {
        let tool = ExternalTool::new("rasp");
        assert_eq!(
            tool.leading_tokens("-12.5 340 -0.0368 extra\n", 3).unwrap(),
            vec![-12.5, 340.0, -0.0368]
        );
        assert!(tool.leading_tokens("1 2", 3).is_err());
        assert!(tool.leading_tokens("1 x 3", 3).is_err());
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let tool = ExternalTool::new("/nonexistent/bin/tool");
        assert!(matches!(
            tool.run(["--help"]),
            Err(ToolError::Spawn { .. })
        ));
    }

    #[test]
    fn score_call_turns_failures_into_nan() {
        let tool = ExternalTool::new("x");
        let scores = score_call("X", &["X1", "X2"], || Err(tool.parse_error("boom")));
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|s| s.value.is_nan()));

        let scores = score_call("X", &["X1"], || Ok(vec![0.5]));
        assert_eq!(scores.get("X1"), Some(0.5));
    }

    #[cfg(unix)]
    mod process {
        use super::super::test_support::fake_tool;
        use super::*;
        use tempfile::tempdir;

        #[test]
        fn run_returns_stdout_of_successful_tool() {
            let dir = tempdir().unwrap();
            let program = fake_tool(dir.path(), "echoer", "echo \"score $1\"");
            let out = ExternalTool::new(program).run(["model.pdb"]).unwrap();
            assert_eq!(out.trim(), "score model.pdb");
        }

        #[test]
        fn non_zero_exit_carries_stderr() {
            let dir = tempdir().unwrap();
            let program = fake_tool(dir.path(), "failing", "echo 'bad input' >&2\nexit 3");
            match ExternalTool::new(program).run(Vec::<&str>::new()) {
                Err(ToolError::Failed { stderr, .. }) => assert_eq!(stderr, "bad input"),
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }
}
