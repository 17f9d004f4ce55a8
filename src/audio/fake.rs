//! In-memory backend used by the controller and app tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use super::types::{AudioBackend, AudioError, Session};

/// What the fake has been asked to do, shared between backend and sessions.
#[derive(Debug, Default)]
pub struct Journal {
    /// Every path handed to `load`, in order.
    pub loaded: Vec<PathBuf>,
    /// Sessions currently alive (loaded and not yet dropped).
    pub live: usize,
    /// Path of the session most recently told to play.
    pub playing: Option<PathBuf>,
}

#[derive(Default)]
pub struct FakeBackend {
    pub journal: Rc<RefCell<Journal>>,
    durations: HashMap<PathBuf, Duration>,
    broken: Vec<PathBuf>,
    /// Finish flag of the most recently loaded session.
    last_finished: Option<Rc<RefCell<bool>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, path: &str, d: Duration) -> Self {
        self.durations.insert(PathBuf::from(path), d);
        self
    }

    /// Make `load` fail for `path`.
    pub fn with_broken(mut self, path: &str) -> Self {
        self.broken.push(PathBuf::from(path));
        self
    }

    /// Simulate the natural end of the newest session.
    pub fn finish_current(&self) {
        if let Some(flag) = &self.last_finished {
            *flag.borrow_mut() = true;
        }
    }

    pub fn live_sessions(&self) -> usize {
        self.journal.borrow().live
    }

    pub fn loaded(&self) -> Vec<PathBuf> {
        self.journal.borrow().loaded.clone()
    }

    pub fn playing(&self) -> Option<PathBuf> {
        self.journal.borrow().playing.clone()
    }
}

impl AudioBackend for FakeBackend {
    type Session = FakeSession;

    fn load(&mut self, path: &Path) -> Result<FakeSession, AudioError> {
        if self.broken.iter().any(|p| p == path) {
            return Err(AudioError::Decode {
                path: path.to_path_buf(),
                reason: "fake decode failure".to_string(),
            });
        }

        let finished = Rc::new(RefCell::new(false));
        self.last_finished = Some(finished.clone());

        let mut journal = self.journal.borrow_mut();
        journal.loaded.push(path.to_path_buf());
        journal.live += 1;
        drop(journal);

        Ok(FakeSession {
            path: path.to_path_buf(),
            journal: self.journal.clone(),
            duration: self.durations.get(path).copied(),
            position: Duration::ZERO,
            playing: false,
            finished,
        })
    }
}

pub struct FakeSession {
    path: PathBuf,
    journal: Rc<RefCell<Journal>>,
    duration: Option<Duration>,
    position: Duration,
    playing: bool,
    finished: Rc<RefCell<bool>>,
}

impl Session for FakeSession {
    fn play(&mut self) {
        self.playing = true;
        self.journal.borrow_mut().playing = Some(self.path.clone());
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn stop(&mut self) {
        self.playing = false;
        let mut journal = self.journal.borrow_mut();
        if journal.playing.as_deref() == Some(self.path.as_path()) {
            journal.playing = None;
        }
    }

    fn seek(&mut self, to: Duration) -> Result<(), AudioError> {
        self.position = to;
        Ok(())
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn is_finished(&self) -> bool {
        *self.finished.borrow()
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.journal.borrow_mut().live -= 1;
    }
}
