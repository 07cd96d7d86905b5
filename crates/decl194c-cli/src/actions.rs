use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use decl194c_core::{
    BlockKind, Declaration, DeclarationRecord, RenderOptions, render_declaration,
    validate_declaration,
};
use decl194c_export::{ExportFormat, PageGeometry, artifact_file_name, export_to_vec};

use crate::CliError;
use crate::workspace::{Settings, write_bytes_atomic};

pub const EXPORT_REFUSED: &str = "Please fill in all required fields before exporting.";
pub const PRINT_REFUSED: &str = "Please fill in all required fields before printing.";
pub const EXPORT_FAILED: &str = "Error generating document. Please try again.";
pub const PRINT_FAILED: &str = "Error sending the declaration to the printer. Please try again.";

const DEFAULT_PRINT_COMMANDS: [&str; 2] = ["lp", "lpr"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedAction {
    Export,
    Print,
}

impl GatedAction {
    fn refusal(&self) -> &'static str {
        match self {
            GatedAction::Export => EXPORT_REFUSED,
            GatedAction::Print => PRINT_REFUSED,
        }
    }
}

/// Refuse `action` unless the record passes validation.
pub fn ensure_valid(record: &DeclarationRecord, action: GatedAction) -> Result<(), CliError> {
    let errors = validate_declaration(record);
    if errors.is_valid() {
        return Ok(());
    }
    tracing::info!(event = "action_refused", action = ?action, errors = errors.len());
    Err(CliError::Refused {
        message: action.refusal(),
        errors,
    })
}

pub fn preview_options(settings: &Settings) -> RenderOptions {
    RenderOptions {
        include_seal_line: settings.preview_seal_line,
    }
}

pub fn export_options(settings: &Settings) -> RenderOptions {
    RenderOptions {
        include_seal_line: settings.export_seal_line,
    }
}

/// Validate, render and write the export artifact into `out_dir`.
pub fn export_declaration(
    record: &DeclarationRecord,
    settings: &Settings,
    out_dir: &Path,
    format: ExportFormat,
) -> Result<PathBuf, CliError> {
    ensure_valid(record, GatedAction::Export)?;

    let declaration = render_declaration(record, export_options(settings));
    let bytes = export_to_vec(format, &declaration, &PageGeometry::a4())?;
    let path = out_dir.join(artifact_file_name(format));
    write_bytes_atomic(&path, &bytes)?;

    tracing::info!(
        event = "export_written",
        format = %format,
        path = %path.display(),
        bytes = bytes.len()
    );
    Ok(path)
}

/// Validate, render the preview text and pipe it to the print command.
/// Returns the program that accepted the job.
pub fn print_declaration(
    record: &DeclarationRecord,
    settings: &Settings,
    command: Option<&str>,
) -> Result<String, CliError> {
    ensure_valid(record, GatedAction::Print)?;

    let declaration = render_declaration(record, preview_options(settings));
    let text = preview_text(&declaration, 80);

    let mut candidates: Vec<String> = Vec::new();
    if let Some(value) = command.or(settings.print_command.as_deref()) {
        candidates.push(value.to_string());
    } else {
        candidates.extend(DEFAULT_PRINT_COMMANDS.iter().map(|c| c.to_string()));
    }

    submit_print_job(&candidates, &text).ok_or_else(|| {
        CliError::InvalidConfig(
            "no print command accepted the job (set print_command)".to_string(),
        )
    })
}

// Pipe `text` to each candidate in turn. A command that cannot start,
// refuses its input or exits unsuccessfully passes the job to the next one.
fn submit_print_job(candidates: &[String], text: &str) -> Option<String> {
    for candidate in candidates {
        let mut parts = candidate.split_whitespace();
        let Some(program) = parts.next() else {
            continue;
        };
        let spawned = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                tracing::debug!(event = "print_command_unavailable", program, error = %err);
                continue;
            }
        };
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(text.as_bytes()) {
                tracing::warn!(event = "print_command_rejected_input", program, error = %err);
                drop(stdin);
                let _ = child.wait();
                continue;
            }
        }
        let status = match child.wait() {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(event = "print_command_lost", program, error = %err);
                continue;
            }
        };
        if status.success() {
            tracing::info!(event = "print_submitted", program);
            return Some(program.to_string());
        }
        tracing::warn!(event = "print_command_failed", program, status = %status);
    }
    None
}

/// Plain text preview: blank line between blocks, the title centred and the
/// signature block pushed to the right half of `width` columns.
pub fn preview_text(declaration: &Declaration, width: usize) -> String {
    let signature_column = width / 2;
    let mut blocks = Vec::with_capacity(declaration.blocks.len());
    for block in &declaration.blocks {
        let lines: Vec<String> = match block.kind {
            BlockKind::Title => block
                .lines
                .iter()
                .map(|line| {
                    let pad = width.saturating_sub(line.chars().count()) / 2;
                    format!("{}{line}", " ".repeat(pad))
                })
                .collect(),
            BlockKind::Signature => block
                .lines
                .iter()
                .map(|line| format!("{}{line}", " ".repeat(signature_column)))
                .collect(),
            _ => block.lines.clone(),
        };
        blocks.push(lines.join("\n"));
    }
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl194c_core::Capacity;

    fn complete() -> DeclarationRecord {
        DeclarationRecord {
            payer_company_name: "Acme Logistics Pvt Ltd".to_string(),
            payer_company_address: "12 MG Road, Pune".to_string(),
            declarant_name: "Ramesh Kumar".to_string(),
            declarant_capacity: Some(Capacity::Director),
            contractor_firm_name: "Kumar Transport".to_string(),
            contractor_firm_address: "45 Station Road, Nagpur".to_string(),
            contractor_pan: "ABCPK1234Q".to_string(),
            financial_year: "2024-2025".to_string(),
            place: "Nagpur".to_string(),
            declaration_date: "15/06/2024".to_string(),
        }
    }

    #[test]
    fn refusal_carries_validation_errors() {
        let err = ensure_valid(&DeclarationRecord::default(), GatedAction::Print)
            .expect_err("refused");
        match err {
            CliError::Refused { message, errors } => {
                assert_eq!(message, PRINT_REFUSED);
                assert_eq!(errors.len(), 8);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn export_writes_named_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = export_declaration(
            &complete(),
            &Settings::default(),
            dir.path(),
            ExportFormat::Text,
        )
        .expect("export");

        assert_eq!(path, dir.path().join("Section_194C_Declaration.txt"));
        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.contains("M/s Kumar Transport"));
        assert!(text.contains("(Seal / Stamp of Firm, if any)"));
    }

    #[test]
    fn refused_export_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut record = complete();
        record.place.clear();
        let err = export_declaration(&record, &Settings::default(), dir.path(), ExportFormat::Pdf)
            .expect_err("refused");
        assert!(matches!(err, CliError::Refused { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 0);
    }

    #[test]
    fn preview_centres_title_and_indents_signature() {
        let declaration = render_declaration(&complete(), RenderOptions::preview());
        let text = preview_text(&declaration, 40);
        assert!(text.contains(&format!("{}Declaration\n", " ".repeat(14))));
        assert!(text.contains(&format!("{}Signature of Declarant", " ".repeat(20))));
        assert!(!text.contains("Seal / Stamp"));
    }

    #[cfg(unix)]
    #[test]
    fn print_uses_configured_command() {
        let program = print_declaration(&complete(), &Settings::default(), Some("cat"))
            .expect("print through cat");
        assert_eq!(program, "cat");
    }

    #[cfg(unix)]
    #[test]
    fn print_reports_when_no_command_accepts() {
        let err = print_declaration(
            &complete(),
            &Settings::default(),
            Some("decl194c-no-such-printer"),
        )
        .expect_err("no printer");
        assert!(matches!(err, CliError::InvalidConfig(_)));
    }

    #[cfg(unix)]
    #[test]
    fn print_falls_through_to_next_command() {
        let candidates = vec!["false".to_string(), "cat".to_string()];
        let text = "x".repeat(256 * 1024);
        assert_eq!(submit_print_job(&candidates, &text).as_deref(), Some("cat"));
    }
}
