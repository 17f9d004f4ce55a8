use std::env;
use std::io;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, warn};

use crate::app::App;
use crate::audio::RodioBackend;
use crate::metadata::MetadataLoader;
use crate::queue::QueueController;

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    match logging::init(&settings.log) {
        Ok(path) => info!(log = %path.display(), "encore starting"),
        Err(e) => eprintln!("encore: logging disabled: {e}"),
    }

    let cwd = env::current_dir()?;
    let tracks = startup::initial_tracks(env::args_os().skip(1), &cwd, &settings);

    let backend = RodioBackend::open_default(settings.audio.volume).inspect_err(|e| {
        error!(error = %e, "cannot open audio output");
    })?;
    let mut queue = QueueController::new(
        backend,
        Duration::from_millis(settings.ui.poll_interval_ms),
    );
    let _ = queue.append(tracks);

    let mut app = App::new();
    let loader = MetadataLoader::spawn();

    enable_raw_mode()?;
    let _restore = TerminalGuard::new(restore_terminal);
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result =
        event_loop::run(&mut terminal, &settings, &mut app, &mut queue, &loader, &cwd);

    terminal.show_cursor()?;
    run_result
}

/// Runs its callback on drop, so raw mode is undone on every exit path
/// once it has been enabled.
struct TerminalGuard<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> TerminalGuard<F> {
    fn new(restore: F) -> Self {
        Self { restore }
    }
}

impl<F: FnMut()> Drop for TerminalGuard<F> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        warn!(error = %e, "cannot disable raw mode");
    }
    // Leaving an alternate screen that was never entered is harmless.
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
        warn!(error = %e, "cannot leave alternate screen");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io;

    use super::TerminalGuard;

    fn setup(restored: &Cell<u32>, fail: bool) -> io::Result<()> {
        let _restore = TerminalGuard::new(|| restored.set(restored.get() + 1));
        if fail {
            return Err(io::Error::other("alternate screen unavailable"));
        }
        Ok(())
    }

    #[test]
    fn guard_restores_when_setup_fails_early() {
        let restored = Cell::new(0);
        assert!(setup(&restored, true).is_err());
        assert_eq!(restored.get(), 1);
    }

    #[test]
    fn guard_restores_once_on_normal_exit() {
        let restored = Cell::new(0);
        assert!(setup(&restored, false).is_ok());
        assert_eq!(restored.get(), 1);
    }
}
