use std::path::{Path, PathBuf};

use decl194c_export::ExportFormat;
use serde::{Deserialize, Serialize};

use super::atomic::write_bytes_atomic;
use super::{WorkspaceError, WorkspaceResult};

/// Settings read from `decl194c.toml`. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory exported artifacts are written to.
    pub output_dir: PathBuf,
    pub export_format: ExportFormat,
    /// Show the seal line in the on-screen preview.
    pub preview_seal_line: bool,
    /// Print the seal line on exported documents.
    pub export_seal_line: bool,
    /// Command the preview text is piped to when printing. `lp`, then `lpr`,
    /// when unset.
    pub print_command: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            export_format: ExportFormat::Pdf,
            preview_seal_line: false,
            export_seal_line: true,
            print_command: None,
        }
    }
}

/// Load settings from `path`, falling back to defaults when the file does
/// not exist.
pub fn load_settings(path: &Path) -> WorkspaceResult<Settings> {
    if !path.exists() {
        tracing::debug!(event = "settings_defaulted", path = %path.display());
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    tracing::debug!(event = "settings_loaded", path = %path.display());
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> WorkspaceResult<()> {
    let encoded = toml::to_string_pretty(settings)?;
    write_bytes_atomic(path, encoded.as_bytes()).map_err(WorkspaceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = load_settings(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(settings, Settings::default());
        assert!(settings.export_seal_line);
        assert!(!settings.preview_seal_line);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("decl194c.toml");
        std::fs::write(&path, "export_format = \"text\"\nprint_command = \"lpr -P office\"\n")
            .expect("write");

        let settings = load_settings(&path).expect("load");
        assert_eq!(settings.export_format, ExportFormat::Text);
        assert_eq!(settings.print_command.as_deref(), Some("lpr -P office"));
        assert_eq!(settings.output_dir, PathBuf::from("."));
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("decl194c.toml");
        let settings = Settings {
            output_dir: PathBuf::from("out"),
            preview_seal_line: true,
            ..Settings::default()
        };

        save_settings(&path, &settings).expect("save");
        assert_eq!(load_settings(&path).expect("load"), settings);
    }
}
