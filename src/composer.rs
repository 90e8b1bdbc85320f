//! Discharge summary document composition.
//!
//! Turns a patient record and the final summary text into a fixed-layout,
//! paginated PDF: letterhead, title band, two-column identity block, narrative
//! body, consultant and patient attestation blocks, footer rule.
//!
//! Rendering is a pure function of (record, text, images present); the only
//! side effect is [`DocumentComposer::render_to_file`] writing the artifact.

use crate::assets::{AssetError, Assets};
use crate::config::OrganizationConfig;
use crate::layout::{Align, AssetKind, Document, Flow, FontStyle, PageSetup, Rgb};
use crate::pdf::{self, PdfError};
use crate::record::PatientRecord;
use crate::sanitize::{first_unencodable, sanitize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const TITLE: &str = "DISCHARGE SUMMARY";
pub const STATUS: &str = "Discharged";
pub const CONSULTANT_LABEL: &str = "Treating Consultant / Authorized Team Doctor :";
pub const ATTENDANT_LABEL: &str = "Patient / Attendant :";
pub const CONSENT: &str = "I/WE HAVE UNDERSTOOD THE INSTRUCTIONS GIVEN ABOUT THE MEDICATION DOSAGE AND DISCHARGE AFTER CARE.";
pub const BLANK: &str = "_________________________";

const ARTIFACT_PREFIX: &str = "Discharge_Summary_";
const ARTIFACT_EXTENSION: &str = "pdf";

const RULE_WEIGHT: f32 = 0.5;
const DIVIDER_WEIGHT: f32 = 0.3;
const FOOTER_WEIGHT: f32 = 1.0;
const FOOTER_COLOR: Rgb = Rgb(0, 102, 153);

const LOGO_X: f32 = 10.0;
const LOGO_Y: f32 = 8.0;
const LOGO_WIDTH: f32 = 25.0;
const ICON_SIZE: f32 = 10.0;

const COLUMN_WIDTH: f32 = 90.0;
const COLUMN_OFFSET: f32 = 100.0;
const IDENTITY_LINE: f32 = 8.0;
const BODY_LINE: f32 = 5.5;
const BLOCK_LINE: f32 = 8.0;
const BODY_SIZE: f32 = 11.0;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("patient record is missing required field `{0}`")]
    MissingRequiredField(&'static str),
    #[error("field `{field}` contains {character:?}, which cannot be printed")]
    UnsupportedCharacter {
        field: &'static str,
        character: char,
    },
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Record fields the layout reads, checked and resolved up front.
struct Identity<'a> {
    id: &'a str,
    consultant: &'a str,
    name: &'a str,
    age: &'a str,
    gender: &'a str,
    address: &'a str,
    admission_date: &'a str,
    discharge_date: &'a str,
}

impl<'a> Identity<'a> {
    fn resolve(record: &'a PatientRecord) -> Result<Self, ComposeError> {
        let identity = Self {
            id: record
                .id
                .as_deref()
                .ok_or(ComposeError::MissingRequiredField("id"))?,
            consultant: record
                .primary_consultant_name
                .as_deref()
                .ok_or(ComposeError::MissingRequiredField("primary_consultant_name"))?,
            name: PatientRecord::display(&record.name),
            age: PatientRecord::display(&record.age),
            gender: PatientRecord::display(&record.gender),
            address: PatientRecord::display(&record.address),
            admission_date: PatientRecord::display(&record.admission_date),
            discharge_date: PatientRecord::display(&record.discharge_date),
        };
        identity.check_encodable()?;
        Ok(identity)
    }

    /// These fields are printed as-is, so they must already be encodable.
    fn check_encodable(&self) -> Result<(), ComposeError> {
        let fields = [
            ("id", self.id),
            ("primary_consultant_name", self.consultant),
            ("name", self.name),
            ("age", self.age),
            ("gender", self.gender),
            ("address", self.address),
            ("admission_date", self.admission_date),
            ("discharge_date", self.discharge_date),
        ];
        for (field, value) in fields {
            if let Some(character) = first_unencodable(value) {
                return Err(ComposeError::UnsupportedCharacter { field, character });
            }
        }
        Ok(())
    }
}

/// Lays out and serializes discharge summaries.
#[derive(Debug, Clone)]
pub struct DocumentComposer {
    organization: OrganizationConfig,
    assets: Assets,
    setup: PageSetup,
}

impl DocumentComposer {
    pub fn new(organization: OrganizationConfig, assets: Assets) -> Self {
        Self {
            organization,
            assets,
            setup: PageSetup::A4,
        }
    }

    /// Render the summary document for `record` to PDF bytes.
    pub fn render(&self, record: &PatientRecord, summary: &str) -> Result<Vec<u8>, ComposeError> {
        let document = self.layout(record, summary)?;
        let id = record.id.as_deref().unwrap_or_default();
        let bytes = pdf::write(&document, &self.assets, id)?;
        info!(patient_id = %id, pages = document.pages.len(), "rendered discharge summary");
        Ok(bytes)
    }

    /// Render and write `Discharge_Summary_<id>.pdf` into `out_dir`.
    ///
    /// Nothing is written if rendering fails. An existing file for the same
    /// patient is overwritten.
    pub fn render_to_file(
        &self,
        record: &PatientRecord,
        summary: &str,
        out_dir: &Path,
    ) -> Result<PathBuf, ComposeError> {
        let bytes = self.render(record, summary)?;
        let id = record.id.as_deref().unwrap_or_default();
        let path = out_dir.join(artifact_file_name(id));

        std::fs::create_dir_all(out_dir)
            .and_then(|_| std::fs::write(&path, &bytes))
            .map_err(|source| ComposeError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), bytes = bytes.len(), "wrote discharge summary");
        Ok(path)
    }

    /// Position every element of the document without serializing it.
    pub fn layout(&self, record: &PatientRecord, summary: &str) -> Result<Document, ComposeError> {
        let identity = Identity::resolve(record)?;
        self.check_organization()?;

        let mut flow = Flow::new(self.setup);
        self.header(&mut flow);
        self.title_band(&mut flow);
        self.identity_block(&mut flow, &identity);
        self.body(&mut flow, summary);
        self.consultant_block(&mut flow, &identity);
        self.attendant_block(&mut flow);
        self.footer(&mut flow);

        Ok(flow.finish(format!("Discharge Summary {}", identity.id)))
    }

    fn check_organization(&self) -> Result<(), ComposeError> {
        let fields = [
            ("organization.name", self.organization.name.as_str()),
            ("organization.address", self.organization.address.as_str()),
            ("organization.contact", self.organization.contact.as_str()),
        ];
        for (field, value) in fields {
            if let Some(character) = first_unencodable(value) {
                return Err(ComposeError::UnsupportedCharacter { field, character });
            }
        }
        Ok(())
    }

    fn header(&self, flow: &mut Flow) {
        if let Some(height) = self.assets.scaled_height(AssetKind::Logo, LOGO_WIDTH) {
            flow.image(AssetKind::Logo, LOGO_X, LOGO_Y, LOGO_WIDTH, height);
        }
        flow.set_font(FontStyle::Bold, 16.0);
        flow.cell(0.0, 10.0, &self.organization.name, Align::Center, true);
        flow.set_font(FontStyle::Regular, 12.0);
        flow.cell(0.0, 8.0, &self.organization.address, Align::Center, true);
        flow.cell(0.0, 8.0, &self.organization.contact, Align::Center, true);
    }

    fn title_band(&self, flow: &mut Flow) {
        flow.ln(10.0);
        flow.rule(RULE_WEIGHT, Rgb::BLACK);
        flow.ln(2.0);
        flow.set_font(FontStyle::Bold, 14.0);
        flow.cell(0.0, 10.0, TITLE, Align::Center, true);
        flow.ln(2.0);
        flow.rule(RULE_WEIGHT, Rgb::BLACK);
    }

    /// Personal details on the left, admission details on the right, both
    /// starting at the same height. The band is kept on one page.
    fn identity_block(&self, flow: &mut Flow, identity: &Identity) {
        flow.set_font(FontStyle::Regular, BODY_SIZE);
        flow.ln(2.0);

        let left = format!(
            "Name: {}\nAge: {}\nGender: {}\nAddress: {}",
            identity.name, identity.age, identity.gender, identity.address
        );
        let right = format!(
            "Patient UID: {}\nAdmission Date: {}\nDischarge Date: {}\nStatus: {STATUS}",
            identity.id, identity.admission_date, identity.discharge_date
        );

        let rows = flow
            .wrap(&left, COLUMN_WIDTH)
            .len()
            .max(flow.wrap(&right, COLUMN_WIDTH).len());
        flow.ensure_space(rows as f32 * IDENTITY_LINE);

        let (x, y) = (flow.x(), flow.y());
        flow.multi_cell(COLUMN_WIDTH, IDENTITY_LINE, &left);
        let left_bottom = flow.y();

        flow.set_xy(x + COLUMN_OFFSET, y);
        flow.multi_cell(COLUMN_WIDTH, IDENTITY_LINE, &right);
        let right_bottom = flow.y();

        flow.set_xy(x, left_bottom.max(right_bottom));
    }

    fn body(&self, flow: &mut Flow, summary: &str) {
        flow.ln(2.0);
        flow.rule(RULE_WEIGHT, Rgb::BLACK);
        flow.ln(2.0);
        flow.set_font(FontStyle::Regular, BODY_SIZE);
        flow.multi_cell(0.0, BODY_LINE, &sanitize(summary));
    }

    fn consultant_block(&self, flow: &mut Flow, identity: &Identity) {
        flow.ln(5.0);
        flow.rule(RULE_WEIGHT, Rgb::BLACK);
        flow.set_font(FontStyle::Bold, BODY_SIZE);
        flow.cell(0.0, BLOCK_LINE, CONSULTANT_LABEL, Align::Left, true);
        flow.set_font(FontStyle::Regular, BODY_SIZE);
        flow.cell(0.0, BLOCK_LINE, &format!("Name: {}", identity.consultant), Align::Left, true);
        flow.cell(0.0, BLOCK_LINE, &format!("Signature: {BLANK}"), Align::Left, true);
    }

    fn attendant_block(&self, flow: &mut Flow) {
        flow.rule_at(flow.y() + 2.0, DIVIDER_WEIGHT, Rgb::BLACK);
        flow.ln(4.0);
        flow.set_font(FontStyle::Bold, BODY_SIZE);
        flow.cell(0.0, BLOCK_LINE, ATTENDANT_LABEL, Align::Left, true);
        flow.set_font(FontStyle::Regular, BODY_SIZE);
        flow.multi_cell(0.0, BLOCK_LINE, CONSENT);
        flow.cell(0.0, BLOCK_LINE, &format!("Name: {BLANK}"), Align::Left, true);
        flow.cell(0.0, BLOCK_LINE, &format!("Signature: {BLANK}"), Align::Left, true);
    }

    /// Heavy coloured rule with the icon centred on it, straddling the line.
    fn footer(&self, flow: &mut Flow) {
        flow.ensure_space(10.0 + ICON_SIZE / 2.0);
        flow.ln(10.0);
        let y = flow.y();
        flow.rule(FOOTER_WEIGHT, FOOTER_COLOR);
        if self.assets.get(AssetKind::FooterIcon).is_some() {
            let x = (self.setup.width - ICON_SIZE) / 2.0;
            flow.image(AssetKind::FooterIcon, x, y - ICON_SIZE / 2.0, ICON_SIZE, ICON_SIZE);
        }
    }
}

/// File name for a patient's summary. Characters that are unsafe in a file
/// name are replaced with `_`.
pub fn artifact_file_name(id: &str) -> String {
    let safe: String = id
        .trim()
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();
    format!("{ARTIFACT_PREFIX}{safe}.{ARTIFACT_EXTENSION}")
}
