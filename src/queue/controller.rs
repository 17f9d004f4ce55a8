use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::audio::{AudioBackend, AudioError, PlaybackState, Session};

use super::poll::SeekPoll;

/// What an operation did. Callers decide whether a no-op is worth reporting.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The operation changed state.
    Applied,
    /// Already at the first/last entry; nothing changed.
    Boundary,
    /// The index was outside the queue; nothing changed.
    InvalidIndex,
    /// The operation needs a session and there is none.
    NoSession,
    /// There is no track to act on.
    NoTrack,
}

/// Result of a controller tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickEvent {
    Idle,
    /// A track ended and the queue moved on to this index.
    Advanced(usize),
    /// A track ended with nothing left to play.
    Finished,
}

/// Seek control values in whole seconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SeekView {
    pub position: u64,
    pub max: u64,
}

impl Default for SeekView {
    fn default() -> Self {
        Self {
            position: 0,
            max: 100,
        }
    }
}

impl SeekView {
    fn of(duration: Option<Duration>, position: Duration) -> Self {
        match duration {
            Some(d) if !d.is_zero() => Self {
                position: position.as_secs(),
                max: d.as_secs(),
            },
            _ => Self::default(),
        }
    }
}

/// A request to refresh the now-playing view.
///
/// `path == None` asks for the empty "No song playing" state. `epoch` is the
/// controller epoch the request was issued for; replies for an older epoch
/// must be discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataTicket {
    pub epoch: u64,
    pub path: Option<PathBuf>,
}

/// The single live session and the track it is bound to.
struct Active<S> {
    session: S,
    path: PathBuf,
    /// Survived a queue clear and no longer corresponds to the cursor.
    detached: bool,
}

/// Owns the play queue, the cursor and the one playback session.
pub struct QueueController<B: AudioBackend> {
    backend: B,
    tracks: Vec<PathBuf>,
    cursor: usize,
    detached: Option<PathBuf>,
    active: Option<Active<B::Session>>,
    state: PlaybackState,
    poll: SeekPoll,
    seek: SeekView,
    epoch: u64,
    pending_metadata: Option<MetadataTicket>,
}

/// Step back from the reported end so a seek never lands on or past it.
const END_GUARD: Duration = Duration::from_millis(100);

/// Clamp a requested seek position against the track length.
pub fn clamp_seek(position: Duration, duration: Option<Duration>) -> Duration {
    match duration {
        Some(d) if !d.is_zero() && position >= d => d.saturating_sub(END_GUARD),
        _ => position,
    }
}

impl<B: AudioBackend> QueueController<B> {
    pub fn new(backend: B, poll_interval: Duration) -> Self {
        Self {
            backend,
            tracks: Vec::new(),
            cursor: 0,
            detached: None,
            active: None,
            state: PlaybackState::Stopped,
            poll: SeekPoll::new(poll_interval),
            seek: SeekView::default(),
            epoch: 0,
            pending_metadata: None,
        }
    }

    pub fn tracks(&self) -> &[PathBuf] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Track held outside the queue after a clear, if any.
    pub fn detached(&self) -> Option<&Path> {
        self.detached.as_deref()
    }

    pub fn has_session(&self) -> bool {
        self.active.is_some()
    }

    /// Path bound to the live session.
    pub fn session_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.path.as_path())
    }

    /// Queue index of the live session, unless it is the detached track.
    pub fn playing_index(&self) -> Option<usize> {
        self.active
            .as_ref()
            .filter(|a| !a.detached)
            .map(|_| self.cursor)
    }

    #[cfg(test)]
    /// The track considered current: the cursor entry, else the detached track.
    pub fn current_path(&self) -> Option<&Path> {
        self.tracks
            .get(self.cursor)
            .map(PathBuf::as_path)
            .or(self.detached.as_deref())
    }

    pub fn seek_view(&self) -> SeekView {
        self.seek
    }

    #[cfg(test)]
    pub fn is_polling(&self) -> bool {
        self.poll.is_active()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Hand over the pending now-playing refresh, if one was requested.
    pub fn take_metadata_request(&mut self) -> Option<MetadataTicket> {
        self.pending_metadata.take()
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Append tracks to the end of the queue. Cursor and playback are untouched.
    pub fn append<I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let before = self.tracks.len();
        self.tracks.extend(paths);
        let added = self.tracks.len() - before;
        if added > 0 {
            debug!(added, total = self.tracks.len(), "appended to queue");
        }
        added
    }

    /// Start playing the queue entry at `index`.
    pub fn play_at(&mut self, index: usize) -> Result<Outcome, AudioError> {
        if index >= self.tracks.len() {
            debug!(index, len = self.tracks.len(), "play_at out of range");
            return Ok(Outcome::InvalidIndex);
        }

        self.teardown();
        self.cursor = index;
        self.detached = None;
        let path = self.tracks[index].clone();
        self.start_session(path)
    }

    pub fn toggle_play_pause(&mut self) -> Result<Outcome, AudioError> {
        let playing = self.state == PlaybackState::Playing;
        let Some(active) = self.active.as_mut() else {
            return self.start_current();
        };

        if playing {
            active.session.pause();
            self.state = PlaybackState::Paused;
            self.poll.cancel();
        } else {
            active.session.play();
            self.state = PlaybackState::Playing;
            self.poll.start(Instant::now());
        }
        self.refresh_seek();
        Ok(Outcome::Applied)
    }

    pub fn next(&mut self) -> Result<Outcome, AudioError> {
        if self.tracks.is_empty() {
            return Ok(Outcome::NoTrack);
        }
        if self.cursor + 1 >= self.tracks.len() {
            return Ok(Outcome::Boundary);
        }
        self.play_at(self.cursor + 1)
    }

    pub fn previous(&mut self) -> Result<Outcome, AudioError> {
        if self.tracks.is_empty() {
            return Ok(Outcome::NoTrack);
        }
        if self.cursor == 0 {
            return Ok(Outcome::Boundary);
        }
        self.play_at(self.cursor - 1)
    }

    /// Release the session and return to the start of the queue.
    pub fn stop(&mut self) -> Outcome {
        self.teardown();
        self.cursor = 0;
        self.detached = None;
        self.refresh_seek();
        self.request_metadata(None);
        info!("playback stopped");
        Outcome::Applied
    }

    pub fn remove_at(&mut self, index: usize) -> Outcome {
        if index >= self.tracks.len() {
            debug!(index, len = self.tracks.len(), "remove_at out of range");
            return Outcome::InvalidIndex;
        }

        if index == self.cursor {
            self.teardown();
            self.detached = None;
            self.request_metadata(None);
        } else if index < self.cursor {
            self.cursor -= 1;
        }

        let removed = self.tracks.remove(index);
        if self.cursor >= self.tracks.len() {
            self.cursor = 0;
        }
        self.refresh_seek();
        debug!(index, path = %removed.display(), "removed from queue");
        Outcome::Applied
    }

    /// Empty the queue. A live session keeps playing as the detached track.
    pub fn clear(&mut self) -> Outcome {
        match self.active.as_mut() {
            Some(active) => {
                active.detached = true;
                self.detached = Some(active.path.clone());
            }
            None => self.detached = None,
        }
        self.tracks.clear();
        self.cursor = 0;
        debug!(kept = ?self.detached, "queue cleared");
        Outcome::Applied
    }

    /// Seek the live session to `position`, clamped short of the end.
    pub fn seek(&mut self, position: Duration) -> Result<Outcome, AudioError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(Outcome::NoSession);
        };
        let target = clamp_seek(position, active.session.duration());
        active.session.seek(target)?;
        self.refresh_seek();
        Ok(Outcome::Applied)
    }

    /// Seek relative to the current position.
    pub fn seek_by(&mut self, delta_secs: i64) -> Result<Outcome, AudioError> {
        let Some(active) = self.active.as_ref() else {
            return Ok(Outcome::NoSession);
        };
        let pos = active.session.position();
        let step = Duration::from_secs(delta_secs.unsigned_abs());
        let target = if delta_secs >= 0 {
            pos.saturating_add(step)
        } else {
            pos.saturating_sub(step)
        };
        self.seek(target)
    }

    /// Seek to a fraction of the track length.
    pub fn seek_fraction(&mut self, fraction: f64) -> Result<Outcome, AudioError> {
        let Some(duration) = self.active.as_ref().and_then(|a| a.session.duration()) else {
            return Ok(Outcome::NoSession);
        };
        let fraction = fraction.clamp(0.0, 1.0);
        self.seek(duration.mul_f64(fraction))
    }

    /// Drive end-of-track detection and the seek poll.
    pub fn tick(&mut self, now: Instant) -> Result<TickEvent, AudioError> {
        let ended = self.state == PlaybackState::Playing
            && self.active.as_ref().is_some_and(|a| a.session.is_finished());
        if ended {
            return self.on_track_end();
        }

        if self.poll.due(now) {
            self.refresh_seek();
        }
        Ok(TickEvent::Idle)
    }

    fn on_track_end(&mut self) -> Result<TickEvent, AudioError> {
        let was_detached = self.active.as_ref().is_some_and(|a| a.detached);
        self.teardown();
        if was_detached {
            self.detached = None;
        }

        // A detached track hands over as if it had been playing at the cursor.
        let next = (self.cursor + 1 < self.tracks.len()).then_some(self.cursor + 1);

        match next {
            Some(index) => {
                let _ = self.play_at(index)?;
                Ok(TickEvent::Advanced(index))
            }
            None => {
                self.refresh_seek();
                info!("reached end of queue");
                Ok(TickEvent::Finished)
            }
        }
    }

    fn start_current(&mut self) -> Result<Outcome, AudioError> {
        if self.cursor < self.tracks.len() {
            return self.play_at(self.cursor);
        }
        Ok(Outcome::NoTrack)
    }

    fn start_session(&mut self, path: PathBuf) -> Result<Outcome, AudioError> {
        self.request_metadata(Some(path.clone()));

        let mut session = match self.backend.load(&path) {
            Ok(session) => session,
            Err(e) => {
                self.state = PlaybackState::Stopped;
                self.refresh_seek();
                return Err(e);
            }
        };

        session.play();
        info!(path = %path.display(), "now playing");
        self.active = Some(Active {
            session,
            path,
            detached: false,
        });
        self.state = PlaybackState::Playing;
        self.poll.start(Instant::now());
        self.refresh_seek();
        Ok(Outcome::Applied)
    }

    /// Stop and release the live session, if any.
    fn teardown(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.session.stop();
        }
        self.poll.cancel();
        self.state = PlaybackState::Stopped;
    }

    fn refresh_seek(&mut self) {
        self.seek = match &self.active {
            Some(a) => SeekView::of(a.session.duration(), a.session.position()),
            None => SeekView::default(),
        };
    }

    fn request_metadata(&mut self, path: Option<PathBuf>) {
        self.epoch += 1;
        self.pending_metadata = Some(MetadataTicket {
            epoch: self.epoch,
            path,
        });
    }
}
