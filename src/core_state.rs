//! Shared application state handed to every request handler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;

use crate::assistant::{AssistantError, GeminiClient, LlmClient};
use crate::config::AppConfig;
use crate::db::{self, DatabaseError};
use crate::diagnosis::{DiagnosisEngine, ScriptEngine};

pub struct CoreState {
    /// SQLite database file. Each request opens its own connection.
    pub db_path: PathBuf,
    pub diagnosis: Arc<dyn DiagnosisEngine>,
    pub llm: Arc<dyn LlmClient>,
}

impl CoreState {
    pub fn new(
        db_path: PathBuf,
        diagnosis: Arc<dyn DiagnosisEngine>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            db_path,
            diagnosis,
            llm,
        }
    }

    /// Wire the production engine and LLM client from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, AssistantError> {
        let engine = ScriptEngine::new(
            &config.diagnosis.python,
            &config.diagnosis.script,
            Duration::from_secs(config.diagnosis.timeout_secs),
        )
        .with_api_key(config.gemini.api_key.clone())
        .with_max_results(config.diagnosis.max_results);

        let llm = GeminiClient::new(
            &config.gemini.base_url,
            &config.gemini.model,
            &config.gemini.api_key,
            config.gemini.timeout_secs,
        )?;

        Ok(Self::new(config.database_path.clone(), Arc::new(engine), Arc::new(llm)))
    }

    /// Open a connection to the patient database, creating and migrating
    /// it on first use.
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        db::open_database(&self.db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::MockLlmClient;
    use crate::diagnosis::MockDiagnosisEngine;

    #[test]
    fn open_db_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("patients.db");
        let state = CoreState::new(
            path.clone(),
            Arc::new(MockDiagnosisEngine::new("[]")),
            Arc::new(MockLlmClient::new("ok")),
        );

        let conn = state.open_db().unwrap();
        assert_eq!(db::get_current_version(&conn), 1);
        assert!(path.exists());
    }

    #[test]
    fn from_config_uses_database_path() {
        let config = AppConfig::from_lookup(|var| match var {
            "DATABASE_PATH" => Some("/tmp/dashboard-test.db".into()),
            _ => None,
        })
        .unwrap();
        let state = CoreState::from_config(&config).unwrap();
        assert_eq!(state.db_path, PathBuf::from("/tmp/dashboard-test.db"));
    }
}
