//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::audio::{AudioBackend, PlaybackState};
use crate::config::Settings;
use crate::metadata::base_name;
use crate::picker::FilePicker;
use crate::queue::{QueueController, SeekView};

const LEFT_PAD: Padding = Padding {
    left: 1,
    right: 0,
    top: 0,
    bottom: 0,
};

/// Render the controls help text with the current play/pause label.
fn controls_text(state: PlaybackState, scrub_seconds: u64) -> String {
    [
        "[a] add songs".to_string(),
        format!("[space/p] {}", state.button_label()),
        "[h/l] prev/next".to_string(),
        "[s] stop".to_string(),
        format!("[H/L] scrub -/+{scrub_seconds}s"),
        "[0-9] seek %".to_string(),
        "[j/k] up/down".to_string(),
        "[gg/G] top/bottom".to_string(),
        "[enter] play selected".to_string(),
        "[d] remove".to_string(),
        "[c] clear".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

fn picker_controls_text() -> &'static str {
    "[j/k] move | [space] toggle | [*] all | [enter/l] open | [h] up | [tab] add | [esc] cancel"
}

/// Format whole seconds as `MM:SS`.
fn format_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Seek gauge label and fill ratio.
fn seek_label(view: SeekView, has_session: bool) -> (String, f64) {
    if !has_session {
        return ("--:-- / --:--".to_string(), 0.0);
    }
    let ratio = if view.max == 0 {
        0.0
    } else {
        (view.position as f64 / view.max as f64).clamp(0.0, 1.0)
    };
    (
        format!(
            "{} / {}",
            format_mmss(view.position),
            format_mmss(view.max)
        ),
        ratio,
    )
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Visible window of `total` rows that keeps `selected` roughly centered.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

/// Render the entire UI into the provided `frame`.
pub fn draw<B: AudioBackend>(
    frame: &mut Frame,
    app: &App,
    queue: &QueueController<B>,
    settings: &Settings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(settings.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    // Now playing
    {
        let mut lines = vec![Line::from(app.now_playing.label.as_str()).bold()];
        if settings.ui.show_cover_info {
            if let Some(cover) = &app.now_playing.cover {
                lines.push(Line::from(format!("cover: {}", cover.describe())).italic());
            }
        }
        if let Some(path) = queue.session_path() {
            let note = if queue.detached().is_some() {
                " (not in queue)"
            } else {
                ""
            };
            lines.push(Line::from(format!("{}{note}", path.display())).dim());
        }
        let np = Paragraph::new(lines)
            .block(Block::bordered().padding(LEFT_PAD).title(" now playing "))
            .wrap(Wrap { trim: true });
        frame.render_widget(np, chunks[1]);
    }

    // Seek gauge
    {
        let (label, ratio) = seek_label(queue.seek_view(), queue.has_session());
        let gauge = Gauge::default()
            .block(Block::bordered().title(" seek "))
            .gauge_style(Style::default().add_modifier(Modifier::REVERSED))
            .ratio(ratio)
            .label(label);
        frame.render_widget(gauge, chunks[2]);
    }

    // Queue list
    {
        let tracks = queue.tracks();
        let total = tracks.len();
        let list_height = chunks[3].height.saturating_sub(2) as usize;
        let selected = app.selected.min(total.saturating_sub(1));
        let (start, end) = visible_window(total, list_height, selected);

        let items: Vec<ListItem> = tracks[start..end]
            .iter()
            .enumerate()
            .map(|(offset, path)| {
                let i = start + offset;
                let marker = if queue.playing_index() == Some(i) {
                    match queue.state() {
                        PlaybackState::Playing => "▶ ",
                        _ => "‖ ",
                    }
                } else {
                    "  "
                };
                let item = ListItem::new(format!("{marker}{}", base_name(path)));
                if i == queue.cursor() {
                    item.bold()
                } else {
                    item
                }
            })
            .collect();

        let title = format!(" queue ({total}) ");
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(selected - start));
        }
        frame.render_stateful_widget(list, chunks[3], &mut state);

        if let Some(picker) = &app.picker {
            draw_picker(frame, picker, chunks[3]);
        }
    }

    let status = Paragraph::new(app.status.as_deref().unwrap_or("")).italic();
    frame.render_widget(status, chunks[4]);

    let footer_text = if app.is_picking() {
        picker_controls_text().to_string()
    } else {
        controls_text(queue.state(), settings.controls.scrub_seconds)
    };
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(LEFT_PAD),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}

/// Overlay the picker inside `area`, keeping the rest of the screen visible.
fn draw_picker(frame: &mut Frame, picker: &FilePicker, area: Rect) {
    let popup = centered_rect_sized(area.width.saturating_mul(4) / 5, area.height, area);
    frame.render_widget(Clear, popup);

    let title = format!(" add songs: {} ", picker.dir().display());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_bottom(format!(" {} selected ", picker.selected().len()));

    if let Some(err) = picker.error() {
        let msg = Paragraph::new(format!("cannot read directory: {err}"))
            .block(block.padding(LEFT_PAD))
            .wrap(Wrap { trim: true });
        frame.render_widget(msg, popup);
        return;
    }

    let entries = picker.entries();
    let height = popup.height.saturating_sub(2) as usize;
    let (start, end) = visible_window(entries.len(), height, picker.highlighted());
    let items: Vec<ListItem> = entries[start..end]
        .iter()
        .map(|e| {
            if e.is_dir {
                ListItem::new(format!("    {}/", e.name)).bold()
            } else if picker.is_selected(&e.path) {
                ListItem::new(format!("[x] {}", e.name))
            } else {
                ListItem::new(format!("[ ] {}", e.name))
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    if !entries.is_empty() {
        state.select(Some(picker.highlighted() - start));
    }
    frame.render_stateful_widget(list, popup, &mut state);
}
