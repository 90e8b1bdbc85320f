//! Terminal interaction: prompts, the draft editor, and colored output.
//!
//! Everything the user sees goes through here so `main` only wires steps
//! together. Status lines go to stderr; data the user asked for (patient
//! info, prompts) goes to stdout.

use crate::record::PatientRecord;
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use std::io;
use std::path::Path;

/// Both stdin and stdout are attached to a terminal.
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

/// Use `given` when present, otherwise ask for it.
pub fn ask(label: &str, given: Option<String>) -> Result<String, dialoguer::Error> {
    if let Some(value) = given {
        return Ok(value);
    }
    if !is_interactive() {
        return Ok(String::new());
    }
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()
}

/// Open the draft in `$VISUAL`/`$EDITOR` and return what was saved.
pub fn edit_draft(draft: &str) -> io::Result<String> {
    edit::edit(draft)
}

pub fn print_patient(record: &PatientRecord) {
    let row = |label: &str, value: &Option<String>| {
        println!("  {:<22} {}", format!("{label}:").dimmed(), PatientRecord::display(value));
    };

    println!("{}", "Patient Information".bold().underline());
    row("Name", &record.name);
    row("Patient ID", &record.id);
    row("Age", &record.age);
    row("Gender", &record.gender);
    row("Address", &record.address);
    row("Admission Date", &record.admission_date);
    row("Discharge Date", &record.discharge_date);
    row("Primary Consultant", &record.primary_consultant_name);
}

pub fn print_draft(draft: &str) {
    println!("\n{}\n", "Generated Discharge Summary".bold().underline());
    println!("{draft}");
}

pub fn status(message: &str) {
    eprintln!("{} {}", "::".cyan().bold(), message);
}

pub fn success(path: &Path) {
    eprintln!(
        "{} Discharge summary PDF generated: {}",
        "✔".green().bold(),
        path.display().to_string().bold()
    );
}

pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}
