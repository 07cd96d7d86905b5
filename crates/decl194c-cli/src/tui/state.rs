use std::path::PathBuf;

use decl194c_core::{
    Capacity, Declaration, DeclarationRecord, Field, ValidationResult, normalize_date_input,
    render_declaration,
};

use crate::CliError;
use crate::actions::{self, EXPORT_FAILED, PRINT_FAILED};
use crate::workspace::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

/// State of one interactive editing session. The record lives only as long
/// as the session.
pub struct App {
    pub record: DeclarationRecord,
    pub settings: Settings,
    pub out_dir: PathBuf,
    pub selected: usize,
    /// Errors shown next to fields. Filled by gated actions, cleared per
    /// field as the user edits it.
    pub errors: ValidationResult,
    pub show_preview: bool,
    pub preview_scroll: u16,
    /// First form row on screen.
    pub form_scroll: u16,
    pub status: Option<Status>,
    pub should_quit: bool,
}

impl App {
    pub fn new(record: DeclarationRecord, settings: Settings, out_dir: PathBuf) -> Self {
        Self {
            record,
            settings,
            out_dir,
            selected: 0,
            errors: ValidationResult::default(),
            show_preview: true,
            preview_scroll: 0,
            form_scroll: 0,
            status: None,
            should_quit: false,
        }
    }

    pub fn selected_field(&self) -> Field {
        Field::ALL[self.selected.min(Field::ALL.len() - 1)]
    }

    pub fn select_next(&mut self) {
        self.commit_date();
        self.selected = (self.selected + 1) % Field::ALL.len();
    }

    pub fn select_prev(&mut self) {
        self.commit_date();
        self.selected = (self.selected + Field::ALL.len() - 1) % Field::ALL.len();
    }

    /// Preview rendering of the live record.
    pub fn preview(&self) -> Declaration {
        render_declaration(&self.record, actions::preview_options(&self.settings))
    }

    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn push_char(&mut self, ch: char) {
        let field = self.selected_field();
        if field == Field::DeclarantCapacity {
            self.select_capacity_by_initial(ch);
            return;
        }
        let mut value = self.record.value(field);
        value.push(ch);
        self.apply(field, &value);
    }

    pub fn pop_char(&mut self) {
        let field = self.selected_field();
        if field == Field::DeclarantCapacity {
            self.set_capacity(None);
            return;
        }
        let mut value = self.record.value(field);
        value.pop();
        self.apply(field, &value);
    }

    pub fn clear_field(&mut self) {
        let field = self.selected_field();
        self.apply(field, "");
    }

    /// Enter: a line break in address fields, otherwise move on.
    pub fn newline(&mut self) {
        let field = self.selected_field();
        if field.is_multiline() {
            self.push_char('\n');
        } else {
            self.select_next();
        }
    }

    pub fn cycle_capacity(&mut self, forward: bool) {
        if self.selected_field() != Field::DeclarantCapacity {
            return;
        }
        let next = Capacity::cycle(self.record.declarant_capacity, forward);
        self.set_capacity(next);
    }

    pub fn toggle_preview(&mut self) {
        self.show_preview = !self.show_preview;
        let text = if self.show_preview {
            "Preview shown"
        } else {
            "Preview hidden"
        };
        self.set_status(StatusKind::Info, text);
    }

    pub fn scroll_preview(&mut self, delta: i32) {
        self.preview_scroll = if delta < 0 {
            self.preview_scroll.saturating_sub(delta.unsigned_abs() as u16)
        } else {
            self.preview_scroll.saturating_add(delta as u16)
        };
    }

    /// Scroll the form so rows `first..=last` are on screen, favouring
    /// `first` when they do not all fit in `height` rows.
    pub fn keep_form_in_view(&mut self, first: u16, last: u16, height: u16) {
        if height == 0 {
            return;
        }
        if first < self.form_scroll {
            self.form_scroll = first;
        } else if last >= self.form_scroll.saturating_add(height) {
            self.form_scroll = (last + 1).saturating_sub(height).min(first);
        }
    }

    pub fn export(&mut self) {
        self.commit_date();
        let format = self.settings.export_format;
        match actions::export_declaration(&self.record, &self.settings, &self.out_dir, format) {
            Ok(path) => {
                self.errors = ValidationResult::default();
                self.set_status(StatusKind::Success, format!("Saved {}", path.display()));
            }
            Err(err) => self.report_failure(err, EXPORT_FAILED),
        }
    }

    pub fn print(&mut self) {
        self.commit_date();
        match actions::print_declaration(&self.record, &self.settings, None) {
            Ok(program) => {
                self.errors = ValidationResult::default();
                self.set_status(StatusKind::Success, format!("Sent to {program}"));
            }
            Err(err) => self.report_failure(err, PRINT_FAILED),
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(Status {
            kind,
            text: text.into(),
        });
    }

    fn report_failure(&mut self, err: CliError, generic: &str) {
        match err {
            CliError::Refused { message, errors } => {
                self.errors = errors;
                self.set_status(StatusKind::Error, message);
            }
            other => {
                tracing::error!(event = "action_failed", error = %other);
                self.set_status(StatusKind::Error, generic);
            }
        }
    }

    fn set_capacity(&mut self, capacity: Option<Capacity>) {
        self.record = self.record.with_capacity(capacity);
        self.errors = self.errors.without(Field::DeclarantCapacity);
    }

    // Repeating an initial steps through capacities sharing it.
    fn select_capacity_by_initial(&mut self, ch: char) {
        let initial = ch.to_ascii_uppercase();
        let matches: Vec<Capacity> = Capacity::ALL
            .into_iter()
            .filter(|c| c.as_str().starts_with(initial))
            .collect();
        let picked = match self
            .record
            .declarant_capacity
            .and_then(|current| matches.iter().position(|c| *c == current))
        {
            Some(idx) => matches.get((idx + 1) % matches.len()).copied(),
            None => matches.first().copied(),
        };
        if let Some(capacity) = picked {
            self.set_capacity(Some(capacity));
        }
    }

    // Replace the record through the reducer and drop the field's error.
    fn apply(&mut self, field: Field, value: &str) {
        match self.record.with_field(field, value) {
            Ok(next) => {
                self.record = next;
                self.errors = self.errors.without(field);
            }
            Err(err) => self.set_status(StatusKind::Error, err.to_string()),
        }
    }

    // Dates typed as yyyy-mm-dd or d/m/yyyy are stored as dd/mm/yyyy once
    // the user leaves the field.
    fn commit_date(&mut self) {
        if self.selected_field() != Field::DeclarationDate {
            return;
        }
        if let Some(normalized) = normalize_date_input(&self.record.declaration_date) {
            if normalized != self.record.declaration_date {
                self.apply(Field::DeclarationDate, &normalized);
            }
        }
    }
}
