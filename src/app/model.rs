//! UI-only state: list selection, now-playing view, open picker and status.
//!
//! Everything about the queue itself lives in `QueueController`; `App` only
//! remembers what the user is looking at.

use crate::metadata::{MetadataReply, NowPlaying};
use crate::picker::FilePicker;

/// The main application model.
#[derive(Debug, Default)]
pub struct App {
    pub selected: usize,
    pub now_playing: NowPlaying,
    pub picker: Option<FilePicker>,
    /// Transient message shown until the next key press.
    pub status: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move selection down one row, stopping at the last.
    pub fn next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    /// Move selection up one row, stopping at the first.
    pub fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep the selection on a real row after the queue shrank.
    pub fn clamp_selection(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn is_picking(&self) -> bool {
        self.picker.is_some()
    }

    /// Apply a metadata reply unless the controller has moved on since it was
    /// requested. Returns whether the view changed.
    pub fn apply_metadata(&mut self, reply: MetadataReply, current_epoch: u64) -> bool {
        if reply.ticket.epoch != current_epoch {
            return false;
        }
        self.now_playing = reply.now_playing;
        true
    }
}
