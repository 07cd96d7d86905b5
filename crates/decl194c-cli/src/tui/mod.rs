pub mod events;
pub mod state;
pub mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use decl194c_core::DeclarationRecord;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::CliError;
use crate::workspace::Settings;
use events::handle_key;
use state::App;
use ui::draw_ui;

/// Runs the interactive form until the user quits. Nothing is saved; the
/// record is dropped on exit.
pub fn run(
    record: DeclarationRecord,
    settings: Settings,
    out_dir: PathBuf,
) -> Result<(), CliError> {
    let mut app = App::new(record, settings, out_dir);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    tracing::info!(event = "edit_session_started");
    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    tracing::info!(event = "edit_session_finished");

    result
}

fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), CliError> {
    while !app.should_quit {
        terminal.draw(|frame| draw_ui(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let event::Event::Key(key) = event::read()? {
                // Windows reports both press and release.
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key);
                }
            }
        }
    }
    Ok(())
}
