//! Dischargen CLI - discharge summary drafting
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use dischargen::{ui, ChatCompletionClient, Config, Workflow};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "dischargen")]
#[command(author, version, about = "Draft, edit and print hospital discharge summaries", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use this config file instead of dischargen.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a patient, draft a summary, edit it and write the PDF
    Generate(GenerateArgs),
    /// Show a patient's details
    Lookup(PatientArgs),
    /// Print the prompt that would be sent for a patient
    Prompt(PatientArgs),
    /// Render an existing summary text file without calling the service
    Render {
        #[command(flatten)]
        patient: PatientArgs,
        /// Text file holding the summary body
        #[arg(long)]
        summary: PathBuf,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Args, Default)]
struct GenerateArgs {
    /// Patient name (prompted for when omitted)
    #[arg(long)]
    name: Option<String>,
    /// Patient ID (prompted for when omitted)
    #[arg(long)]
    id: Option<String>,
    /// Patient dataset (JSON array)
    #[arg(long)]
    data: Option<PathBuf>,
    /// Output directory
    #[arg(long)]
    out: Option<PathBuf>,
    /// Use the generated draft as-is
    #[arg(long)]
    no_edit: bool,
}

#[derive(Args)]
struct PatientArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    id: String,
    /// Patient dataset (JSON array)
    #[arg(long)]
    data: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        ui::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "dischargen=warn",
        1 => "dischargen=info",
        _ => "dischargen=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Config::load()?,
    };

    match cli.command {
        Some(Commands::Generate(args)) => generate(config, args).await,
        None => generate(config, GenerateArgs::default()).await,
        Some(Commands::Lookup(args)) => {
            let workflow = open(config, args.data, None)?;
            let session = workflow.select(&args.name, &args.id)?;
            ui::print_patient(&session.record);
            Ok(())
        }
        Some(Commands::Prompt(args)) => {
            let workflow = open(config, args.data, None)?;
            let session = workflow.select(&args.name, &args.id)?;
            println!("{}", session.prompt);
            Ok(())
        }
        Some(Commands::Render {
            patient,
            summary,
            out,
        }) => {
            let text = std::fs::read_to_string(&summary)
                .with_context(|| format!("failed to read summary {}", summary.display()))?;
            let workflow = open(config, patient.data, out)?;
            let mut session = workflow.select(&patient.name, &patient.id)?;
            session.edit(text);
            let path = workflow.finish(&session)?;
            ui::success(&path);
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "dischargen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Apply command-line overrides and build the workflow.
fn open(
    mut config: Config,
    data: Option<PathBuf>,
    out: Option<PathBuf>,
) -> anyhow::Result<Workflow> {
    if let Some(data) = data {
        config.data.patients = data;
    }
    if let Some(out) = out {
        config.output.dir = out;
    }
    debug!(data = %config.data.patients.display(), out = %config.output.dir.display(), "opening workflow");

    let workflow = Workflow::from_config(&config)?;
    if let Some(e) = workflow.data_error() {
        ui::warning(e);
    }
    Ok(workflow)
}

async fn generate(config: Config, args: GenerateArgs) -> anyhow::Result<()> {
    let client_config = config.clone();
    let workflow = open(config, args.data, args.out)?;

    let name = ui::ask("Enter Patient's Name", args.name)?;
    let id = ui::ask("Enter Patient ID", args.id)?;
    let mut session = workflow.select(&name, &id)?;
    ui::print_patient(&session.record);

    let client = ChatCompletionClient::from_config(&client_config)
        .map_err(dischargen::WorkflowError::from)?;
    ui::status("Generating discharge summary...");
    workflow.draft(&client, &mut session).await?;

    if args.no_edit || !ui::is_interactive() {
        ui::print_draft(&session.draft);
    } else {
        let edited = ui::edit_draft(&session.draft).context("editor failed")?;
        session.edit(edited);
    }

    let path = workflow.finish(&session)?;
    ui::success(&path);
    Ok(())
}
