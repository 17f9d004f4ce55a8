use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info, warn};

use crate::app::App;
use crate::audio::{AudioBackend, AudioError};
use crate::config;
use crate::metadata::MetadataLoader;
use crate::picker::FilePicker;
use crate::queue::{Outcome, QueueController, TickEvent};
use crate::runtime::startup::picker_start_dir;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: handles input, ticks the queue, keeps the
/// now-playing view in sync and draws. Returns `Ok(())` when shutdown is
/// requested.
pub fn run<B: AudioBackend>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    queue: &mut QueueController<B>,
    loader: &MetadataLoader,
    cwd: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = EventLoopState::default();

    loop {
        match queue.tick(Instant::now()) {
            Ok(TickEvent::Advanced(index)) => app.selected = index,
            Ok(TickEvent::Idle | TickEvent::Finished) => {}
            Err(e) => report_error(app, "advance", &e),
        }
        sync_metadata(app, queue, loader);

        terminal.draw(|f| ui::draw(f, app, queue, settings))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, queue, &mut state, cwd) {
                    break;
                }
            }
        }
    }

    info!("shutting down");
    Ok(())
}

/// Forward a pending metadata request and apply any replies that are still
/// current.
fn sync_metadata<B: AudioBackend>(
    app: &mut App,
    queue: &mut QueueController<B>,
    loader: &MetadataLoader,
) {
    if let Some(ticket) = queue.take_metadata_request() {
        loader.request(ticket);
    }
    while let Some(reply) = loader.try_recv() {
        let epoch = reply.ticket.epoch;
        if !app.apply_metadata(reply, queue.epoch()) {
            debug!(epoch, current = queue.epoch(), "dropped stale metadata reply");
        }
    }
}

fn report_error(app: &mut App, action: &'static str, err: &AudioError) {
    warn!(action, error = %err, "playback error");
    app.set_status(err.to_string());
}

/// Log no-ops and surface errors. Returns true when the action took effect.
fn report(app: &mut App, action: &'static str, result: Result<Outcome, AudioError>) -> bool {
    match result {
        Ok(Outcome::Applied) => true,
        Ok(outcome) => {
            debug!(action, ?outcome, "nothing to do");
            false
        }
        Err(e) => {
            report_error(app, action, &e);
            false
        }
    }
}

/// Selection follows the cursor after anything that moved playback.
fn follow_cursor<B: AudioBackend>(app: &mut App, queue: &QueueController<B>, applied: bool) {
    if applied {
        app.selected = queue.cursor();
    }
}

fn add_tracks<B: AudioBackend>(app: &mut App, queue: &mut QueueController<B>, paths: Vec<PathBuf>) {
    if paths.is_empty() {
        debug!("picker closed without a selection");
        return;
    }
    let added = queue.append(paths);
    info!(added, total = queue.len(), "added tracks");
    app.set_status(format!("added {added} track(s)"));
}

fn handle_picker_key<B: AudioBackend>(key: KeyEvent, app: &mut App, queue: &mut QueueController<B>) {
    let Some(picker) = app.picker.as_mut() else {
        return;
    };

    let picked = match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            picker.move_down();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            picker.move_up();
            None
        }
        KeyCode::Char('g') => {
            picker.move_top();
            None
        }
        KeyCode::Char('G') => {
            picker.move_bottom();
            None
        }
        KeyCode::Char(' ') => {
            picker.toggle();
            picker.move_down();
            None
        }
        KeyCode::Char('*') => {
            picker.select_all();
            None
        }
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => picker.enter(),
        KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
            picker.parent();
            None
        }
        KeyCode::Tab => Some(picker.confirm()),
        KeyCode::Esc | KeyCode::Char('q') => Some(picker.cancel()),
        _ => None,
    };

    if let Some(paths) = picked {
        app.picker = None;
        add_tracks(app, queue, paths);
    }
}

/// Handle one key press. Returns true when the user asked to quit.
pub fn handle_key_event<B: AudioBackend>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    queue: &mut QueueController<B>,
    state: &mut EventLoopState,
    cwd: &Path,
) -> bool {
    app.clear_status();

    if app.is_picking() {
        state.pending_gg = false;
        handle_picker_key(key, app, queue);
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    let scrub = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('a') => {
            let start = picker_start_dir(settings, cwd);
            debug!(dir = %start.display(), "opening picker");
            app.picker = Some(FilePicker::open(&start, &settings.picker));
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            let applied = report(app, "play/pause", queue.toggle_play_pause());
            follow_cursor(app, queue, applied && queue.playing_index().is_some());
        }
        KeyCode::Char('l') => {
            let applied = report(app, "next", queue.next());
            follow_cursor(app, queue, applied);
        }
        KeyCode::Char('h') => {
            let applied = report(app, "previous", queue.previous());
            follow_cursor(app, queue, applied);
        }
        KeyCode::Char('s') => {
            let _ = report(app, "stop", Ok(queue.stop()));
        }
        KeyCode::Char('c') => {
            let _ = report(app, "clear", Ok(queue.clear()));
            app.select_first();
        }
        KeyCode::Char('L') => {
            let _ = report(app, "seek", queue.seek_by(scrub));
        }
        KeyCode::Char('H') => {
            let _ = report(app, "seek", queue.seek_by(-scrub));
        }
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = c.to_digit(10).unwrap_or(0);
            let _ = report(app, "seek", queue.seek_fraction(f64::from(tenth) / 10.0));
        }
        KeyCode::Char('j') | KeyCode::Down => app.next(queue.len()),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.select_last(queue.len()),
        KeyCode::Enter => {
            let applied = report(app, "play", queue.play_at(app.selected));
            follow_cursor(app, queue, applied);
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            let _ = report(app, "remove", Ok(queue.remove_at(app.selected)));
            app.clamp_selection(queue.len());
        }
        _ => {}
    }

    false
}
