//! # Dischargen
//!
//! Drafts hospital discharge summaries with an LLM and prints them as PDFs.
//!
//! ## Flow
//!
//! - **Lookup**: find a patient in a JSON dataset by name and ID
//! - **Draft**: send a structured prompt to an OpenAI-compatible chat endpoint
//! - **Edit**: the clinician revises the draft in their editor
//! - **Render**: a fixed letterhead layout written to `Discharge_Summary_<ID>.pdf`

pub mod agent;
pub mod assets;
pub mod composer;
pub mod config;
pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod prompt;
pub mod record;
pub mod sanitize;
pub mod store;
pub mod ui;
pub mod workflow;

pub use agent::{AgentError, ChatCompletionClient, SummaryClient};
pub use composer::{ComposeError, DocumentComposer};
pub use config::Config;
pub use record::PatientRecord;
pub use store::PatientStore;
pub use workflow::{Session, Workflow, WorkflowError};
