use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::DiagnosisError;

/// Produces candidate diagnoses for a symptom description.
///
/// Implementations return the engine's raw stdout; extracting the JSON
/// payload is the caller's job (see [`super::parse_diagnoses`]).
#[async_trait]
pub trait DiagnosisEngine: Send + Sync {
    async fn run(&self, symptom_description: &str) -> Result<String, DiagnosisError>;
}

/// Runs the diagnostic assistant script as a child process.
///
/// Invoked as `<interpreter> <script> <json>` where the JSON argument
/// carries the description, the model API key and the result limit.
pub struct ScriptEngine {
    interpreter: PathBuf,
    script: PathBuf,
    api_key: String,
    max_results: u32,
    timeout: Duration,
}

impl ScriptEngine {
    pub fn new(
        interpreter: impl Into<PathBuf>,
        script: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            api_key: String::new(),
            max_results: 3,
            timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    fn payload(&self, symptom_description: &str) -> String {
        serde_json::json!({
            "symptom_description": symptom_description,
            "gemini_api_key": self.api_key,
            "max_results": self.max_results,
        })
        .to_string()
    }
}

#[async_trait]
impl DiagnosisEngine for ScriptEngine {
    async fn run(&self, symptom_description: &str) -> Result<String, DiagnosisError> {
        let child = Command::new(&self.interpreter)
            .arg(&self.script)
            .arg(self.payload(symptom_description))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DiagnosisError::Spawn {
                program: self.interpreter.display().to_string(),
                source: e,
            })?;

        // Dropping the pending future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| DiagnosisError::TimedOut(self.timeout.as_secs()))??;

        if !output.status.success() {
            return Err(DiagnosisError::ProcessFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Engine returning canned output, for tests and offline runs.
pub struct MockDiagnosisEngine {
    result: Result<String, String>,
}

impl MockDiagnosisEngine {
    pub fn new(stdout: &str) -> Self {
        Self {
            result: Ok(stdout.to_string()),
        }
    }

    /// Behave like a script that exited with status 1 and `stderr`.
    pub fn failing(stderr: &str) -> Self {
        Self {
            result: Err(stderr.to_string()),
        }
    }
}

#[async_trait]
impl DiagnosisEngine for MockDiagnosisEngine {
    async fn run(&self, _symptom_description: &str) -> Result<String, DiagnosisError> {
        match &self.result {
            Ok(stdout) => Ok(stdout.clone()),
            Err(stderr) => Err(DiagnosisError::ProcessFailed {
                code: Some(1),
                stderr: stderr.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn script(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{body}").unwrap();
        file
    }

    fn sh_engine(file: &tempfile::NamedTempFile, timeout: Duration) -> ScriptEngine {
        ScriptEngine::new("sh", file.path(), timeout)
    }

    #[tokio::test]
    async fn captures_stdout_of_successful_run() {
        let file = script(
            r#"echo "Analyzing symptoms"; echo '[{"diagnosis":"PCOS","certainty_score":0.8}]'"#,
        );
        let stdout = sh_engine(&file, Duration::from_secs(10)).run("acne").await.unwrap();
        assert!(stdout.contains("Analyzing symptoms"));
        assert!(stdout.contains("\"PCOS\""));
    }

    #[tokio::test]
    async fn passes_json_payload_as_argument() {
        let file = script(r#"printf '%s\n' "$1""#);
        let engine = sh_engine(&file, Duration::from_secs(10))
            .with_api_key("test-key")
            .with_max_results(5);
        let stdout = engine.run("pelvic pain").await.unwrap();
        let payload: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
        assert_eq!(payload["symptom_description"], "pelvic pain");
        assert_eq!(payload["gemini_api_key"], "test-key");
        assert_eq!(payload["max_results"], 5);
    }

    #[tokio::test]
    async fn non_zero_exit_reports_stderr() {
        let file = script("echo 'AI Diagnosis Error: key missing' >&2; exit 1");
        let err = sh_engine(&file, Duration::from_secs(10)).run("x").await.unwrap_err();
        match err {
            DiagnosisError::ProcessFailed { code, stderr } => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "AI Diagnosis Error: key missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_script_times_out() {
        let file = script("sleep 5");
        let err = sh_engine(&file, Duration::from_millis(100)).run("x").await.unwrap_err();
        assert!(matches!(err, DiagnosisError::TimedOut(_)));
    }

    #[tokio::test]
    async fn missing_interpreter_fails_to_spawn() {
        let engine = ScriptEngine::new("/nonexistent/python", "script.py", Duration::from_secs(1));
        let err = engine.run("x").await.unwrap_err();
        assert!(matches!(err, DiagnosisError::Spawn { .. }));
    }

    #[tokio::test]
    async fn mock_engine_returns_configured_output() {
        assert_eq!(MockDiagnosisEngine::new("[]").run("x").await.unwrap(), "[]");
        assert!(MockDiagnosisEngine::failing("boom").run("x").await.is_err());
    }
}
