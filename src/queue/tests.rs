use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::*;
use crate::audio::PlaybackState;
use crate::audio::fake::FakeBackend;

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

fn controller(backend: FakeBackend) -> QueueController<FakeBackend> {
    QueueController::new(backend, Duration::from_millis(500))
}

fn abc() -> QueueController<FakeBackend> {
    let mut q = controller(FakeBackend::new());
    q.append(paths(&["a.mp3", "b.mp3", "c.mp3"]));
    q
}

fn end_current(q: &mut QueueController<FakeBackend>) -> TickEvent {
    q.backend().finish_current();
    q.tick(Instant::now()).unwrap()
}

#[test]
fn append_leaves_cursor_and_state_alone() {
    let mut q = abc();
    assert_eq!(q.play_at(1).unwrap(), Outcome::Applied);

    let added = q.append(paths(&["d.mp3", "a.mp3"]));
    assert_eq!(added, 2);
    assert_eq!(q.len(), 5);
    assert_eq!(q.cursor(), 1);
    assert_eq!(q.state(), PlaybackState::Playing);
    // Duplicates are kept.
    assert_eq!(q.tracks()[4], PathBuf::from("a.mp3"));
}

#[test]
fn play_at_starts_session_and_poll() {
    let mut q = abc();
    assert_eq!(q.play_at(2).unwrap(), Outcome::Applied);

    assert_eq!(q.cursor(), 2);
    assert_eq!(q.state(), PlaybackState::Playing);
    assert!(q.is_polling());
    assert_eq!(q.playing_index(), Some(2));
    assert_eq!(q.backend().playing(), Some(PathBuf::from("c.mp3")));

    let ticket = q.take_metadata_request().unwrap();
    assert_eq!(ticket.path, Some(PathBuf::from("c.mp3")));
    assert_eq!(ticket.epoch, q.epoch());
}

#[test]
fn play_at_out_of_range_is_invalid_and_harmless() {
    let mut q = abc();
    q.play_at(0).unwrap().ok_or_panic();
    let epoch = q.epoch();

    assert_eq!(q.play_at(3).unwrap(), Outcome::InvalidIndex);
    assert_eq!(q.cursor(), 0);
    assert_eq!(q.state(), PlaybackState::Playing);
    assert_eq!(q.epoch(), epoch);
}

#[test]
fn starting_a_track_releases_the_previous_session() {
    let mut q = abc();
    q.play_at(0).unwrap().ok_or_panic();
    q.play_at(1).unwrap().ok_or_panic();
    q.play_at(2).unwrap().ok_or_panic();

    assert_eq!(q.backend().live_sessions(), 1);
    assert_eq!(q.backend().loaded(), paths(&["a.mp3", "b.mp3", "c.mp3"]));
}

#[test]
fn toggle_without_session_plays_cursor() {
    let mut q = abc();
    assert_eq!(q.toggle_play_pause().unwrap(), Outcome::Applied);
    assert_eq!(q.session_path(), Some(Path::new("a.mp3")));
    assert_eq!(q.state(), PlaybackState::Playing);
}

#[test]
fn toggle_on_empty_queue_reports_no_track() {
    let mut q = controller(FakeBackend::new());
    assert_eq!(q.toggle_play_pause().unwrap(), Outcome::NoTrack);
    assert!(!q.has_session());
}

#[test]
fn toggle_pauses_and_resumes_with_poll() {
    let mut q = abc();
    q.play_at(0).unwrap().ok_or_panic();

    q.toggle_play_pause().unwrap().ok_or_panic();
    assert_eq!(q.state(), PlaybackState::Paused);
    assert!(!q.is_polling());
    assert!(q.has_session());

    q.toggle_play_pause().unwrap().ok_or_panic();
    assert_eq!(q.state(), PlaybackState::Playing);
    assert!(q.is_polling());
    assert_eq!(q.backend().live_sessions(), 1);
}

#[test]
fn next_and_previous_are_noops_at_the_edges() {
    let mut q = abc();
    q.play_at(0).unwrap().ok_or_panic();
    assert_eq!(q.previous().unwrap(), Outcome::Boundary);
    assert_eq!(q.cursor(), 0);
    assert_eq!(q.session_path(), Some(Path::new("a.mp3")));

    q.play_at(2).unwrap().ok_or_panic();
    let epoch = q.epoch();
    assert_eq!(q.next().unwrap(), Outcome::Boundary);
    assert_eq!(q.cursor(), 2);
    assert_eq!(q.session_path(), Some(Path::new("c.mp3")));
    assert_eq!(q.epoch(), epoch);
}

#[test]
fn next_and_previous_move_one_step() {
    let mut q = abc();
    q.play_at(0).unwrap().ok_or_panic();
    assert_eq!(q.next().unwrap(), Outcome::Applied);
    assert_eq!(q.cursor(), 1);
    assert_eq!(q.session_path(), Some(Path::new("b.mp3")));

    assert_eq!(q.previous().unwrap(), Outcome::Applied);
    assert_eq!(q.cursor(), 0);
}

#[test]
fn navigation_on_empty_queue_reports_no_track() {
    let mut q = controller(FakeBackend::new());
    assert_eq!(q.next().unwrap(), Outcome::NoTrack);
    assert_eq!(q.previous().unwrap(), Outcome::NoTrack);
}

#[test]
fn natural_end_advances_to_next_track() {
    let mut q = abc();
    q.play_at(0).unwrap().ok_or_panic();

    assert_eq!(end_current(&mut q), TickEvent::Advanced(1));
    assert_eq!(q.cursor(), 1);
    assert_eq!(q.state(), PlaybackState::Playing);
    assert_eq!(q.backend().playing(), Some(PathBuf::from("b.mp3")));
    assert_eq!(q.backend().live_sessions(), 1);
}

#[test]
fn natural_end_of_last_track_stops_in_place() {
    let mut q = abc();
    q.play_at(2).unwrap().ok_or_panic();

    assert_eq!(end_current(&mut q), TickEvent::Finished);
    assert_eq!(q.cursor(), 2);
    assert_eq!(q.state(), PlaybackState::Stopped);
    assert!(!q.has_session());
    assert!(!q.is_polling());
    assert_eq!(q.seek_view(), SeekView::default());

    // The end is reported once.
    assert_eq!(q.tick(Instant::now()).unwrap(), TickEvent::Idle);
}

#[test]
fn paused_session_does_not_report_end() {
    let mut q = abc();
    q.play_at(0).unwrap().ok_or_panic();
    q.toggle_play_pause().unwrap().ok_or_panic();
    q.backend().finish_current();

    assert_eq!(q.tick(Instant::now()).unwrap(), TickEvent::Idle);
    assert_eq!(q.cursor(), 0);
}

#[test]
fn stop_resets_everything() {
    let mut q = abc();
    q.play_at(2).unwrap().ok_or_panic();
    q.take_metadata_request();

    assert_eq!(q.stop(), Outcome::Applied);
    assert_eq!(q.cursor(), 0);
    assert_eq!(q.state(), PlaybackState::Stopped);
    assert!(!q.has_session());
    assert!(!q.is_polling());
    assert_eq!(q.backend().live_sessions(), 0);

    let ticket = q.take_metadata_request().unwrap();
    assert_eq!(ticket.path, None);
}

#[test]
fn remove_current_tears_down_and_keeps_cursor_on_next_item() {
    let mut q = abc();
    q.play_at(1).unwrap().ok_or_panic();

    assert_eq!(q.remove_at(1), Outcome::Applied);
    assert!(!q.has_session());
    assert_eq!(q.state(), PlaybackState::Stopped);
    assert_eq!(q.cursor(), 1);
    assert_eq!(q.current_path(), Some(Path::new("c.mp3")));
    assert_eq!(q.take_metadata_request().unwrap().path, None);
}

#[test]
fn remove_current_last_entry_wraps_cursor_to_zero() {
    let mut q = abc();
    q.play_at(2).unwrap().ok_or_panic();
    q.remove_at(2).ok_or_panic();
    assert_eq!(q.cursor(), 0);
    assert_eq!(q.len(), 2);
}

#[test]
fn remove_only_entry_leaves_empty_queue() {
    let mut q = controller(FakeBackend::new());
    q.append(paths(&["solo.mp3"]));
    q.play_at(0).unwrap().ok_or_panic();

    q.remove_at(0).ok_or_panic();
    assert!(q.is_empty());
    assert_eq!(q.cursor(), 0);
    assert!(!q.has_session());
    assert_eq!(q.current_path(), None);
}

#[test]
fn remove_before_cursor_keeps_identity() {
    let mut q = abc();
    q.play_at(2).unwrap().ok_or_panic();

    assert_eq!(q.remove_at(0), Outcome::Applied);
    assert_eq!(q.cursor(), 1);
    assert_eq!(q.current_path(), Some(Path::new("c.mp3")));
    assert_eq!(q.session_path(), Some(Path::new("c.mp3")));
    assert_eq!(q.state(), PlaybackState::Playing);
}

#[test]
fn remove_after_cursor_changes_nothing_else() {
    let mut q = abc();
    q.play_at(0).unwrap().ok_or_panic();

    q.remove_at(2).ok_or_panic();
    assert_eq!(q.cursor(), 0);
    assert_eq!(q.tracks(), paths(&["a.mp3", "b.mp3"]).as_slice());
    assert!(q.has_session());
}

#[test]
fn remove_out_of_range_is_invalid() {
    let mut q = abc();
    assert_eq!(q.remove_at(3), Outcome::InvalidIndex);
    assert_eq!(q.len(), 3);
}

#[test]
fn clear_while_playing_detaches_the_playing_track() {
    let mut q = abc();
    q.play_at(1).unwrap().ok_or_panic();

    assert_eq!(q.clear(), Outcome::Applied);
    assert!(q.is_empty());
    assert_eq!(q.cursor(), 0);
    assert_eq!(q.detached(), Some(Path::new("b.mp3")));
    assert_eq!(q.current_path(), Some(Path::new("b.mp3")));
    assert_eq!(q.state(), PlaybackState::Playing);
    assert_eq!(q.playing_index(), None);
    assert_eq!(q.backend().live_sessions(), 1);
}

#[test]
fn clear_while_stopped_keeps_nothing() {
    let mut q = abc();
    q.clear().ok_or_panic();
    assert!(q.is_empty());
    assert_eq!(q.detached(), None);
    assert_eq!(q.current_path(), None);
}

#[test]
fn detached_track_survives_appends_and_advances_past_cursor() {
    let mut q = abc();
    q.play_at(2).unwrap().ok_or_panic();
    q.clear().ok_or_panic();
    q.append(paths(&["x.mp3", "y.mp3"]));

    // Still the detached session; the cursor sits at the head of the new queue.
    assert_eq!(q.session_path(), Some(Path::new("c.mp3")));
    assert_eq!(q.playing_index(), None);
    assert_eq!(q.cursor(), 0);

    // The end advances cursor + 1, skipping queue[0].
    assert_eq!(end_current(&mut q), TickEvent::Advanced(1));
    assert_eq!(q.session_path(), Some(Path::new("y.mp3")));
    assert_eq!(q.playing_index(), Some(1));
    assert_eq!(q.detached(), None);
}

#[test]
fn detached_track_ending_with_one_queued_entry_stops() {
    let mut q = abc();
    q.play_at(1).unwrap().ok_or_panic();
    q.clear().ok_or_panic();
    q.append(paths(&["x.mp3"]));

    assert_eq!(end_current(&mut q), TickEvent::Finished);
    assert!(!q.has_session());
    assert_eq!(q.state(), PlaybackState::Stopped);
    assert_eq!(q.cursor(), 0);
    assert_eq!(q.detached(), None);

    // Play/pause then starts from the cursor.
    q.toggle_play_pause().unwrap().ok_or_panic();
    assert_eq!(q.session_path(), Some(Path::new("x.mp3")));
}

#[test]
fn detached_track_ending_on_empty_queue_finishes() {
    let mut q = abc();
    q.play_at(0).unwrap().ok_or_panic();
    q.clear().ok_or_panic();

    assert_eq!(end_current(&mut q), TickEvent::Finished);
    assert_eq!(q.detached(), None);
    assert!(!q.has_session());
    // Nothing left to resume once the detached track is gone.
    assert_eq!(q.toggle_play_pause().unwrap(), Outcome::NoTrack);
}

#[test]
fn stop_drops_detached_track() {
    let mut q = abc();
    q.play_at(0).unwrap().ok_or_panic();
    q.clear().ok_or_panic();
    q.stop().ok_or_panic();
    assert_eq!(q.detached(), None);
    assert_eq!(q.toggle_play_pause().unwrap(), Outcome::NoTrack);
}

#[test]
fn seek_clamps_short_of_duration() {
    let backend = FakeBackend::new().with_duration("a.mp3", Duration::from_secs(180));
    let mut q = controller(backend);
    q.append(paths(&["a.mp3"]));
    q.play_at(0).unwrap().ok_or_panic();

    assert_eq!(q.seek(Duration::from_secs(180)).unwrap(), Outcome::Applied);
    assert_eq!(q.seek_view(), SeekView { position: 179, max: 180 });

    q.seek(Duration::from_secs(500)).unwrap().ok_or_panic();
    assert_eq!(q.seek_view().position, 179);

    q.seek(Duration::from_secs(42)).unwrap().ok_or_panic();
    assert_eq!(q.seek_view().position, 42);
}

#[test]
fn clamp_seek_math() {
    let d = Some(Duration::from_secs(180));
    assert_eq!(clamp_seek(Duration::from_secs(180), d), Duration::from_millis(179_900));
    assert_eq!(clamp_seek(Duration::from_secs(179), d), Duration::from_secs(179));
    assert_eq!(clamp_seek(Duration::from_secs(900), None), Duration::from_secs(900));
    assert_eq!(
        clamp_seek(Duration::from_secs(3), Some(Duration::ZERO)),
        Duration::from_secs(3)
    );
}

#[test]
fn seek_without_session_is_reported() {
    let mut q = abc();
    assert_eq!(q.seek(Duration::from_secs(1)).unwrap(), Outcome::NoSession);
    assert_eq!(q.seek_by(5).unwrap(), Outcome::NoSession);
    assert_eq!(q.seek_fraction(0.5).unwrap(), Outcome::NoSession);
}

#[test]
fn seek_by_and_fraction() {
    let backend = FakeBackend::new().with_duration("a.mp3", Duration::from_secs(100));
    let mut q = controller(backend);
    q.append(paths(&["a.mp3"]));
    q.play_at(0).unwrap().ok_or_panic();

    q.seek_by(10).unwrap().ok_or_panic();
    assert_eq!(q.seek_view().position, 10);
    q.seek_by(-30).unwrap().ok_or_panic();
    assert_eq!(q.seek_view().position, 0);

    q.seek_fraction(0.5).unwrap().ok_or_panic();
    assert_eq!(q.seek_view().position, 50);
    q.seek_fraction(1.0).unwrap().ok_or_panic();
    assert_eq!(q.seek_view().position, 99);
}

#[test]
fn seek_view_without_known_duration_uses_placeholder() {
    let mut q = abc();
    q.play_at(0).unwrap().ok_or_panic();
    assert_eq!(q.seek_view(), SeekView { position: 0, max: 100 });
}

#[test]
fn load_failure_leaves_stopped_state_on_that_index() {
    let backend = FakeBackend::new().with_broken("b.mp3");
    let mut q = controller(backend);
    q.append(paths(&["a.mp3", "b.mp3", "c.mp3"]));
    q.play_at(0).unwrap().ok_or_panic();

    assert!(q.next().is_err());
    assert_eq!(q.cursor(), 1);
    assert_eq!(q.state(), PlaybackState::Stopped);
    assert!(!q.has_session());
    // Still asked for metadata so the name shows up.
    assert_eq!(
        q.take_metadata_request().unwrap().path,
        Some(PathBuf::from("b.mp3"))
    );

    assert_eq!(q.next().unwrap(), Outcome::Applied);
    assert_eq!(q.session_path(), Some(Path::new("c.mp3")));
}

#[test]
fn poll_refreshes_seek_only_while_playing() {
    let backend = FakeBackend::new().with_duration("a.mp3", Duration::from_secs(60));
    let mut q = controller(backend);
    q.append(paths(&["a.mp3"]));
    q.play_at(0).unwrap().ok_or_panic();
    assert!(q.is_polling());

    q.toggle_play_pause().unwrap().ok_or_panic();
    assert!(!q.is_polling());
    assert_eq!(
        q.tick(Instant::now() + Duration::from_secs(5)).unwrap(),
        TickEvent::Idle
    );
}

#[test]
fn every_operation_bumps_epoch_when_current_track_changes() {
    let mut q = abc();
    let e0 = q.epoch();
    q.play_at(0).unwrap().ok_or_panic();
    let e1 = q.epoch();
    assert!(e1 > e0);

    q.append(paths(&["d.mp3"]));
    q.remove_at(3).ok_or_panic();
    q.clear().ok_or_panic();
    assert_eq!(q.epoch(), e1);

    q.stop().ok_or_panic();
    assert!(q.epoch() > e1);
}

#[test]
fn cursor_stays_in_bounds_under_mixed_operations() {
    let mut q = controller(FakeBackend::new());
    q.append(paths(&["0", "1", "2", "3", "4", "5"]));

    // Deterministic mix of operations; `step` picks one and an index.
    for step in 0..200usize {
        let len = q.len();
        match step % 7 {
            0 => {
                let _ = q.play_at(step % (len + 1)).unwrap();
            }
            1 => {
                let _ = q.next().unwrap();
            }
            2 => {
                let _ = q.previous().unwrap();
            }
            3 if len > 2 => {
                let _ = q.remove_at((step * 3) % len);
            }
            4 => {
                q.append([PathBuf::from(format!("n{step}"))]);
            }
            5 => {
                q.backend().finish_current();
                q.tick(Instant::now()).unwrap();
            }
            _ => {
                let _ = q.toggle_play_pause().unwrap();
            }
        }

        if !q.is_empty() {
            assert!(q.cursor() < q.len(), "cursor {} len {}", q.cursor(), q.len());
        }
        assert!(q.backend().live_sessions() <= 1);
    }
}

trait OkOrPanic {
    fn ok_or_panic(self);
}

impl OkOrPanic for Outcome {
    fn ok_or_panic(self) {
        assert_eq!(self, Outcome::Applied);
    }
}
