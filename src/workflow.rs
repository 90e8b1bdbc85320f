//! The single generate-edit-render workflow, with session state held explicitly.
//!
//! A [`Workflow`] owns the read-only pieces (dataset, composer, output
//! directory). Each run gets its own [`Session`], which the caller threads
//! through the steps; nothing is stored between calls.

use crate::agent::{AgentError, SummaryClient};
use crate::assets::Assets;
use crate::composer::{ComposeError, DocumentComposer};
use crate::config::Config;
use crate::prompt;
use crate::record::PatientRecord;
use crate::store::PatientStore;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Every way the workflow can stop. Each is reported to the user; none is retried.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("error loading patient data: {0}")]
    DataUnavailable(String),
    #[error("please enter both patient name and ID")]
    MissingInput,
    #[error("patient not found: no record with ID {id:?} and name {name:?}")]
    NotFound { id: String, name: String },
    #[error("error generating summary: {0}")]
    GenerationFailure(#[from] AgentError),
    #[error("cannot build the document: {0}")]
    MissingRequiredField(ComposeError),
    #[error("error generating PDF: {0}")]
    RenderError(ComposeError),
    #[error("the summary is empty; no document was produced")]
    EmptyDraft,
}

impl From<ComposeError> for WorkflowError {
    fn from(e: ComposeError) -> Self {
        match e {
            ComposeError::MissingRequiredField(_) => WorkflowError::MissingRequiredField(e),
            other => WorkflowError::RenderError(other),
        }
    }
}

/// State for one generation request.
#[derive(Debug, Clone)]
pub struct Session {
    pub record: PatientRecord,
    pub prompt: String,
    /// Starts empty, filled by the service, then owned by the human editor.
    pub draft: String,
}

impl Session {
    pub fn new(record: PatientRecord) -> Self {
        let prompt = prompt::build(&record);
        Self {
            record,
            prompt,
            draft: String::new(),
        }
    }

    /// Replace the draft with the editor's text.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn has_draft(&self) -> bool {
        !self.draft.trim().is_empty()
    }
}

pub struct Workflow {
    store: PatientStore,
    data_error: Option<String>,
    composer: DocumentComposer,
    out_dir: PathBuf,
}

impl Workflow {
    pub fn new(store: PatientStore, composer: DocumentComposer, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            data_error: None,
            composer,
            out_dir: out_dir.into(),
        }
    }

    /// Assemble the workflow from configuration.
    ///
    /// An unreadable dataset does not fail here: the workflow starts with no
    /// records and every lookup reports [`WorkflowError::DataUnavailable`].
    pub fn from_config(config: &Config) -> Result<Self, WorkflowError> {
        let (store, data_error) = PatientStore::load_or_empty(&config.data.patients);
        let assets = Assets::load(&config.assets.dir).map_err(ComposeError::from)?;
        let composer = DocumentComposer::new(config.organization.clone(), assets);
        Ok(Self {
            store,
            data_error: data_error.map(|e| e.to_string()),
            composer,
            out_dir: config.output.dir.clone(),
        })
    }

    /// Problem loading the dataset, if there was one.
    pub fn data_error(&self) -> Option<&str> {
        self.data_error.as_deref()
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Resolve the name/ID pair and open a session for that patient.
    pub fn select(&self, name: &str, id: &str) -> Result<Session, WorkflowError> {
        if name.trim().is_empty() || id.trim().is_empty() {
            return Err(WorkflowError::MissingInput);
        }
        if let Some(e) = &self.data_error {
            return Err(WorkflowError::DataUnavailable(e.clone()));
        }
        let record = self
            .store
            .find(id, name)
            .ok_or_else(|| WorkflowError::NotFound {
                id: id.trim().to_string(),
                name: name.trim().to_string(),
            })?;
        info!(patient_id = %id.trim(), "patient found");
        Ok(Session::new(record.clone()))
    }

    /// Ask the generation service for a first draft.
    ///
    /// On failure the draft is left empty.
    pub async fn draft<C: SummaryClient>(
        &self,
        client: &C,
        session: &mut Session,
    ) -> Result<(), WorkflowError> {
        session.draft.clear();
        match client.generate(&session.prompt).await {
            Ok(text) => {
                session.draft = text;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "summary generation failed");
                Err(WorkflowError::GenerationFailure(e))
            }
        }
    }

    /// Render the session's current draft and write it to the output directory.
    pub fn finish(&self, session: &Session) -> Result<PathBuf, WorkflowError> {
        if !session.has_draft() {
            return Err(WorkflowError::EmptyDraft);
        }
        let path = self
            .composer
            .render_to_file(&session.record, &session.draft, &self.out_dir)?;
        info!(path = %path.display(), "discharge summary ready");
        Ok(path)
    }

    /// Render the draft to bytes without touching the filesystem.
    pub fn render(&self, session: &Session) -> Result<Vec<u8>, WorkflowError> {
        if !session.has_draft() {
            return Err(WorkflowError::EmptyDraft);
        }
        Ok(self.composer.render(&session.record, &session.draft)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrganizationConfig;
    use serde_json::json;

    fn workflow() -> Workflow {
        let store = PatientStore::new(
            serde_json::from_value(json!([
                {"id": "P1", "name": "Jane Doe", "primary_consultant_name": "Dr. Smith"},
                {"id": "P2", "name": "John Roe"},
            ]))
            .unwrap(),
        );
        let composer = DocumentComposer::new(OrganizationConfig::default(), Assets::none());
        Workflow::new(store, composer, std::env::temp_dir())
    }

    #[test]
    fn test_blank_input_is_rejected_first() {
        assert!(matches!(workflow().select("  ", "P1"), Err(WorkflowError::MissingInput)));
        assert!(matches!(workflow().select("Jane Doe", ""), Err(WorkflowError::MissingInput)));
    }

    #[test]
    fn test_select_opens_session_with_prompt() {
        let session = workflow().select("jane doe", "P1").unwrap();
        assert_eq!(session.record.id.as_deref(), Some("P1"));
        assert!(session.prompt.contains(r#""name": "Jane Doe""#));
        assert!(!session.has_draft());
    }

    #[test]
    fn test_unknown_patient() {
        match workflow().select("Jane Doe", "P2") {
            Err(WorkflowError::NotFound { id, name }) => {
                assert_eq!(id, "P2");
                assert_eq!(name, "Jane Doe");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_unavailable_data_blocks_lookup() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.data.patients = dir.path().join("missing.json");
        config.assets.dir = dir.path().to_path_buf();
        config.output.dir = dir.path().join("out");

        let w = Workflow::from_config(&config).unwrap();
        assert!(w.data_error().is_some());
        assert_eq!(w.out_dir(), dir.path().join("out"));
        assert!(matches!(
            w.select("Jane Doe", "P1"),
            Err(WorkflowError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_from_config_loads_dataset() {
        let dir = tempfile::TempDir::new().unwrap();
        let data = dir.path().join("patients_data.json");
        std::fs::write(&data, r#"[{"id": "P1", "name": "Jane Doe"}]"#).unwrap();
        let mut config = Config::default();
        config.data.patients = data;
        config.assets.dir = dir.path().to_path_buf();

        let w = Workflow::from_config(&config).unwrap();
        assert!(w.data_error().is_none());
        assert!(w.select("Jane Doe", "P1").is_ok());
    }

    #[test]
    fn test_empty_draft_renders_nothing() {
        let w = workflow();
        let mut session = w.select("Jane Doe", "P1").unwrap();
        assert!(matches!(w.render(&session), Err(WorkflowError::EmptyDraft)));
        session.edit("   \n");
        assert!(matches!(w.finish(&session), Err(WorkflowError::EmptyDraft)));
    }

    #[test]
    fn test_missing_consultant_is_classified() {
        let w = workflow();
        let mut session = w.select("John Roe", "P2").unwrap();
        session.edit("Recovered.");
        assert!(matches!(
            w.render(&session),
            Err(WorkflowError::MissingRequiredField(_))
        ));
    }

    #[test]
    fn test_render_error_is_classified() {
        let err = WorkflowError::from(ComposeError::UnsupportedCharacter {
            field: "name",
            character: '😀',
        });
        assert!(matches!(err, WorkflowError::RenderError(_)));
    }
}
