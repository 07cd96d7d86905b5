mod actions;
mod logging;
mod tui;
mod workspace;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use decl194c_core::{
    DeclarationRecord, Error as CoreError, ValidationResult, render_declaration,
    validate_declaration,
};
use decl194c_export::{ExportError, ExportFormat};
use logging::{LogTarget, init_logging};
use thiserror::Error;
use workspace::{
    Settings, WorkspaceError, apply_overrides, load_record, load_settings, save_settings,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{message}")]
    Refused {
        message: &'static str,
        errors: ValidationResult,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "decl194c",
    version,
    about = "Section 194C(6) declaration generator"
)]
struct Cli {
    /// Settings file.
    #[arg(long, global = true, default_value = "decl194c.toml")]
    config: PathBuf,
    /// Append JSON log lines to this file instead of logging to stderr.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a new record with today's date and financial year as TOML.
    Init,
    /// Check a record and list the fields that still need attention.
    Validate(ValidateArgs),
    /// Print the declaration text, with placeholders for empty fields.
    Preview(PreviewArgs),
    /// Write the declaration document.
    Export(ExportArgs),
    /// Send the declaration text to the system print command.
    Print(PrintArgs),
    /// Print the JSON Schema of record files.
    Schema,
    /// Fill in the declaration interactively with a live preview.
    Edit(RecordArgs),
    /// Show or create the settings file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective settings.
    Show,
    /// Write the default settings file.
    Init {
        /// Replace an existing settings file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct RecordArgs {
    /// Record file (TOML). Without it a fresh record is used.
    #[arg(long, short = 'r', value_name = "PATH")]
    record: Option<PathBuf>,
    /// Field override applied after loading, e.g. `place=Nagpur`.
    #[arg(long = "field", short = 'f', value_name = "KEY=VALUE")]
    fields: Vec<String>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    record: RecordArgs,
    /// Emit a JSON object instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    record: RecordArgs,
    /// Include the seal line shown on exported documents.
    #[arg(long, default_value_t = false)]
    seal: bool,
    /// Line width used to centre the title.
    #[arg(long, default_value_t = 80)]
    width: usize,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    record: RecordArgs,
    /// Output directory; defaults to the settings value.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Document format (`pdf` or `text`); defaults to the settings value.
    #[arg(long)]
    format: Option<ExportFormat>,
}

#[derive(Args, Debug)]
struct PrintArgs {
    #[command(flatten)]
    record: RecordArgs,
    /// Print command, e.g. `lpr -P office`.
    #[arg(long, value_name = "CMD")]
    command: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let target = match (&cli.log_file, &cli.command) {
        (Some(path), _) => LogTarget::File(path),
        (None, Command::Edit(_)) => LogTarget::Off,
        (None, _) => LogTarget::Stderr,
    };
    if let Err(err) = init_logging(target) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(event = "command_failed", error = %err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

// Settings are loaded per command. `init`, `validate`, `schema` and
// `config init` never read them.
fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = cli.config.as_path();

    match cli.command {
        Command::Init => run_init(),
        Command::Validate(args) => run_validate(args),
        Command::Preview(args) => run_preview(args, &load_settings(config)?),
        Command::Export(args) => run_export(args, &load_settings(config)?),
        Command::Print(args) => run_print(args, &load_settings(config)?),
        Command::Schema => run_schema(),
        Command::Edit(args) => run_edit(args, load_settings(config)?),
        Command::Config(command) => run_config(command, config),
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn session_record(args: &RecordArgs) -> Result<DeclarationRecord, CliError> {
    let record = load_record(args.record.as_deref(), today())?;
    Ok(apply_overrides(record, &args.fields)?)
}

fn run_init() -> Result<ExitCode, CliError> {
    let record = DeclarationRecord::with_defaults(today());
    print!("{}", toml::to_string_pretty(&record)?);
    Ok(ExitCode::SUCCESS)
}

fn run_validate(args: ValidateArgs) -> Result<ExitCode, CliError> {
    let record = session_record(&args.record)?;
    let result = validate_declaration(&record);
    tracing::info!(event = "validated", errors = result.len());

    if args.json {
        let payload = serde_json::json!({
            "valid": result.is_valid(),
            "errors": result.to_keyed_map(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if result.is_valid() {
        println!("declaration is complete");
    } else {
        for line in field_error_lines(&result) {
            println!("{line}");
        }
    }

    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn run_preview(args: PreviewArgs, settings: &Settings) -> Result<ExitCode, CliError> {
    let record = session_record(&args.record)?;
    let mut options = actions::preview_options(settings);
    if args.seal {
        options.include_seal_line = true;
    }
    let declaration = render_declaration(&record, options);
    println!("{}", actions::preview_text(&declaration, args.width));
    Ok(ExitCode::SUCCESS)
}

fn run_export(args: ExportArgs, settings: &Settings) -> Result<ExitCode, CliError> {
    let record = session_record(&args.record)?;
    let out_dir = args.out_dir.unwrap_or_else(|| settings.output_dir.clone());
    let format = args.format.unwrap_or(settings.export_format);

    match actions::export_declaration(&record, settings, &out_dir, format) {
        Ok(path) => {
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(CliError::Refused { message, errors }) => {
            eprintln!("{message}");
            print_field_errors(&errors);
            Ok(ExitCode::from(1))
        }
        Err(err) => {
            tracing::error!(event = "export_failed", error = %err);
            eprintln!("{}", actions::EXPORT_FAILED);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_print(args: PrintArgs, settings: &Settings) -> Result<ExitCode, CliError> {
    let record = session_record(&args.record)?;

    match actions::print_declaration(&record, settings, args.command.as_deref()) {
        Ok(program) => {
            println!("sent to {program}");
            Ok(ExitCode::SUCCESS)
        }
        Err(CliError::Refused { message, errors }) => {
            eprintln!("{message}");
            print_field_errors(&errors);
            Ok(ExitCode::from(1))
        }
        Err(err) => {
            tracing::error!(event = "print_failed", error = %err);
            eprintln!("{}", actions::PRINT_FAILED);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_schema() -> Result<ExitCode, CliError> {
    let schema = schemars::schema_for!(DeclarationRecord);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(ExitCode::SUCCESS)
}

fn run_edit(args: RecordArgs, settings: Settings) -> Result<ExitCode, CliError> {
    let record = session_record(&args)?;
    let out_dir = settings.output_dir.clone();
    tui::run(record, settings, out_dir)?;
    Ok(ExitCode::SUCCESS)
}

fn run_config(command: ConfigCommand, path: &Path) -> Result<ExitCode, CliError> {
    match command {
        ConfigCommand::Show => {
            let settings = load_settings(path)?;
            print!("{}", toml::to_string_pretty(&settings)?);
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::InvalidConfig(format!(
                    "{} already exists (use --force to replace it)",
                    path.display()
                )));
            }
            save_settings(path, &Settings::default())?;
            tracing::info!(event = "settings_written", path = %path.display());
            println!("{}", path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn field_error_lines(errors: &ValidationResult) -> Vec<String> {
    errors
        .iter()
        .map(|(field, message)| format!("  {}: {message}", field.label()))
        .collect()
}

fn print_field_errors(errors: &ValidationResult) {
    for line in field_error_lines(errors) {
        eprintln!("{line}");
    }
}
