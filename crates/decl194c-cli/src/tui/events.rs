use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::state::App;

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        handle_control_key(app, key.code);
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::BackTab => app.select_prev(),
        KeyCode::Down | KeyCode::Tab => app.select_next(),
        KeyCode::Left => app.cycle_capacity(false),
        KeyCode::Right => app.cycle_capacity(true),
        KeyCode::Enter => app.newline(),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Delete => app.clear_field(),
        KeyCode::PageUp => app.scroll_preview(-5),
        KeyCode::PageDown => app.scroll_preview(5),
        KeyCode::Char(ch) => app.push_char(ch),
        _ => {}
    }
}

fn handle_control_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('c') | KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('e') => app.export(),
        KeyCode::Char('p') => app.print(),
        KeyCode::Char('t') => app.toggle_preview(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl194c_core::{DeclarationRecord, Field};
    use std::path::PathBuf;

    use crate::workspace::Settings;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn app() -> App {
        App::new(
            DeclarationRecord::default(),
            Settings::default(),
            PathBuf::from("."),
        )
    }

    #[test]
    fn arrows_move_between_fields() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Up));
        assert_eq!(app.selected_field(), *Field::ALL.last().expect("fields"));
        handle_key(&mut app, key(KeyCode::Down));
        assert_eq!(app.selected_field(), Field::ALL[0]);
    }

    #[test]
    fn typed_characters_edit_the_selected_field() {
        let mut app = app();
        for ch in "Acme".chars() {
            handle_key(&mut app, key(KeyCode::Char(ch)));
        }
        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.record.value(Field::ALL[0]), "Acm");
    }

    #[test]
    fn control_keys_toggle_and_quit() {
        let mut app = app();
        let shown = app.show_preview;
        handle_key(&mut app, ctrl('t'));
        assert_eq!(app.show_preview, !shown);
        assert!(!app.should_quit);
        handle_key(&mut app, ctrl('c'));
        assert!(app.should_quit);
    }

    #[test]
    fn escape_quits() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.should_quit);
    }
}
