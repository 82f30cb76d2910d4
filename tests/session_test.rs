// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{path::PathBuf, sync::Arc, time::Duration};

use tokio::{sync::watch, time::timeout};
use tokio_stream::StreamExt;

use cadence::{
    actions::{
        effects::{ERROR_LOADING_MESSAGE, SideEffect},
        intents::Intent,
    },
    config::SessionConfig,
    model::{Song, SongId, catalog::DemoCatalog},
    player::simulated::EngineRig,
    session::PlayerSession,
    state::ViewState,
};

const WAIT: Duration = Duration::from_secs(5);

const A_LENGTH: Duration = Duration::from_secs(120);
const B_LENGTH: Duration = Duration::from_secs(150);
const C_LENGTH: Duration = Duration::from_secs(200);

fn song(id: SongId, title: &str) -> Song {
    Song {
        id,
        title: title.to_string(),
        artist_name: "The Testers".to_string(),
        year: 1999,
        album_art: format!("{}.png", title),
        audio_file: PathBuf::from(format!("media/{}.mp3", title)),
    }
}

fn abc() -> Vec<Song> {
    vec![song(1, "a"), song(2, "b"), song(3, "c")]
}

// No periodic ticks, tests drive the clock with explicit position ticks.
fn quiet_config() -> SessionConfig {
    SessionConfig {
        tick_interval: Duration::from_secs(3600),
        ..SessionConfig::default()
    }
}

fn start_session(rig: &EngineRig, songs: Vec<Song>, config: SessionConfig) -> PlayerSession {
    rig.set_duration("media/a.mp3", A_LENGTH);
    rig.set_duration("media/b.mp3", B_LENGTH);
    rig.set_duration("media/c.mp3", C_LENGTH);

    PlayerSession::spawn(Arc::new(DemoCatalog::with_songs(songs)), rig.factory(), config)
        .expect("session should start")
}

async fn wait_for(
    states: &mut watch::Receiver<ViewState>,
    predicate: impl FnMut(&ViewState) -> bool,
) -> ViewState {
    timeout(WAIT, states.wait_for(predicate))
        .await
        .expect("timed out waiting for view state")
        .expect("view state stream closed")
        .clone()
}

fn showing(state: &ViewState, id: SongId, duration: Duration) -> bool {
    state.current_song_id() == Some(id) && state.total_duration == duration
}

/// Create then Start, leaving song `a` loaded but not playing.
async fn created_and_started(session: &PlayerSession) -> watch::Receiver<ViewState> {
    let mut states = session.view_states();

    session.process_input(Intent::Create).unwrap();
    session.process_input(Intent::Start).unwrap();
    wait_for(&mut states, |s| showing(s, 1, A_LENGTH)).await;

    states
}

#[tokio::test]
async fn plays_through_the_playlist() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let mut states = session.view_states();

    assert!(session.view_state().loading);

    session.process_input(Intent::Create).unwrap();
    let state = wait_for(&mut states, |s| !s.playlist.is_empty()).await;
    let titles: Vec<_> = state.playlist.iter().map(|item| item.title.as_str()).collect();
    assert_eq!(titles, vec!["a", "b", "c"]);

    session.process_input(Intent::Start).unwrap();
    let state = wait_for(&mut states, |s| showing(s, 1, A_LENGTH)).await;
    assert!(!state.loading);
    assert_eq!(state.song_title, "a");
    assert_eq!(state.song_info, "The Testers - 1999");
    assert_eq!(state.total_duration_label, "02:00");

    for (id, length) in [(2, B_LENGTH), (3, C_LENGTH), (1, A_LENGTH)] {
        session.process_input(Intent::NextSong).unwrap();
        let state = wait_for(&mut states, |s| showing(s, id, length) && s.playing).await;
        assert!(!state.loading);
    }

    session.shutdown().await;
    assert!(!rig.is_playing());
}

#[tokio::test]
async fn stop_keeps_the_playing_flag() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let mut states = created_and_started(&session).await;

    session.process_input(Intent::Play).unwrap();
    wait_for(&mut states, |s| s.playing).await;

    session
        .process_input(Intent::PositionTick(Duration::from_secs(3)))
        .unwrap();
    wait_for(&mut states, |s| s.elapsed_time == Duration::from_secs(3)).await;

    session.process_input(Intent::Stop).unwrap();
    // Seeking with nothing loaded lands at zero, once the stop has gone
    // through.
    session
        .process_input(Intent::SeekTo(Duration::from_secs(10)))
        .unwrap();
    let state = wait_for(&mut states, |s| s.elapsed_time.is_zero()).await;

    assert!(state.playing);
    assert!(!rig.is_playing());
    assert_eq!(rig.calls().pauses, 1);
    assert_eq!(rig.calls().releases, 1);
}

#[tokio::test]
async fn start_after_stop_resumes_where_it_was() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let mut states = created_and_started(&session).await;

    session.process_input(Intent::Play).unwrap();
    wait_for(&mut states, |s| s.playing).await;

    let elapsed = Duration::from_secs(42);
    rig.advance(elapsed);
    session.process_input(Intent::PositionTick(elapsed)).unwrap();
    wait_for(&mut states, |s| s.elapsed_time == elapsed).await;

    session.process_input(Intent::Stop).unwrap();

    // A different reported length tells the restarted load apart.
    let reloaded_length = Duration::from_secs(300);
    rig.set_duration("media/a.mp3", reloaded_length);
    session.process_input(Intent::Start).unwrap();

    let state = wait_for(&mut states, |s| showing(s, 1, reloaded_length)).await;
    assert!(state.playing);
    assert_eq!(state.elapsed_time, elapsed);
    assert_eq!(state.elapsed_time_label, "00:42");

    assert_eq!(rig.calls().seeks, vec![elapsed]);
    assert_eq!(rig.calls().starts, 2);
    assert!(rig.is_playing());
    assert_eq!(rig.position(), elapsed);
}

#[tokio::test]
async fn song_change_starts_the_new_song_from_the_top() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let mut states = created_and_started(&session).await;

    let elapsed = Duration::from_secs(42);
    session.process_input(Intent::SeekTo(elapsed)).unwrap();
    wait_for(&mut states, |s| s.elapsed_time == elapsed).await;

    session.process_input(Intent::NextSong).unwrap();
    let state = wait_for(&mut states, |s| showing(s, 2, B_LENGTH) && s.playing).await;
    assert_eq!(state.elapsed_time, Duration::ZERO);
    assert_eq!(state.elapsed_time_label, "00:00");

    session.process_input(Intent::Stop).unwrap();
    let reloaded_length = Duration::from_secs(300);
    rig.set_duration("media/b.mp3", reloaded_length);
    session.process_input(Intent::Start).unwrap();

    let state = wait_for(&mut states, |s| showing(s, 2, reloaded_length)).await;
    assert!(state.playing);
    assert_eq!(state.elapsed_time, Duration::ZERO);
    assert_eq!(rig.calls().seeks, vec![elapsed]);
    assert_eq!(rig.position(), Duration::ZERO);
}

#[tokio::test]
async fn song_change_supersedes_a_start_in_flight() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let mut states = session.view_states();

    session.process_input(Intent::Create).unwrap();
    wait_for(&mut states, |s| !s.playlist.is_empty()).await;

    let gate = rig.hold_next_prepare();
    session.process_input(Intent::Start).unwrap();
    timeout(WAIT, async {
        while !gate.is_waiting() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("start never reached the engine");

    session.process_input(Intent::NextSong).unwrap();
    wait_for(&mut states, |s| s.current_song_id() == Some(2)).await;
    gate.open();

    let state = wait_for(&mut states, |s| showing(s, 2, B_LENGTH) && s.playing).await;
    assert_eq!(state.song_title, "b");
    assert_eq!(rig.source(), Some(PathBuf::from("media/b.mp3")));
    assert_eq!(rig.calls().prepares, 2);

    // Nothing of the superseded start is left to fold.
    session
        .process_input(Intent::PositionTick(Duration::from_secs(1)))
        .unwrap();
    let state = wait_for(&mut states, |s| s.elapsed_time == Duration::from_secs(1)).await;
    assert_eq!(state.current_song_id(), Some(2));
}

#[tokio::test]
async fn view_state_stream_starts_with_the_current_state() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let mut states = session.view_states();

    session.process_input(Intent::Create).unwrap();
    let created = wait_for(&mut states, |s| !s.playlist.is_empty()).await;

    let mut stream = session.view_state_stream();
    let first = timeout(WAIT, stream.next()).await.unwrap();
    assert_eq!(first, Some(created));

    session.process_input(Intent::Start).unwrap();
    let next = timeout(WAIT, stream.next())
        .await
        .unwrap()
        .expect("view state stream closed");
    assert!(showing(&next, 1, A_LENGTH));
}

#[tokio::test]
async fn failed_start_reports_one_error_and_keeps_the_display() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let effects = session.side_effects();
    let mut states = session.view_states();

    session.process_input(Intent::Create).unwrap();
    let before = wait_for(&mut states, |s| !s.playlist.is_empty()).await;

    rig.fail_prepare(true);
    session.process_input(Intent::Start).unwrap();

    let effect = timeout(WAIT, effects.next()).await.unwrap();
    assert_eq!(
        effect,
        Some(SideEffect::ShowError(ERROR_LOADING_MESSAGE.to_string()))
    );
    assert_eq!(effects.try_next(), None);
    assert_eq!(session.view_state(), before);
}

#[tokio::test]
async fn failed_song_change_reports_one_error() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let effects = session.side_effects();
    let mut states = created_and_started(&session).await;

    rig.fail_source("media/b.mp3");
    session.process_input(Intent::NextSong).unwrap();

    let effect = timeout(WAIT, effects.next()).await.unwrap();
    assert_eq!(
        effect,
        Some(SideEffect::ShowError(ERROR_LOADING_MESSAGE.to_string()))
    );

    // The interim change already shows the new song, the failed load leaves
    // it with the previous length.
    let state = wait_for(&mut states, |s| s.current_song_id() == Some(2)).await;
    assert_eq!(state.total_duration, A_LENGTH);
    assert!(!state.playing);
    assert_eq!(rig.calls().releases, 1);
    assert_eq!(effects.try_next(), None);

    // The session stays usable.
    session.process_input(Intent::NextSong).unwrap();
    wait_for(&mut states, |s| showing(s, 3, C_LENGTH) && s.playing).await;
}

#[tokio::test]
async fn jumping_to_the_current_song_does_nothing() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let mut states = created_and_started(&session).await;

    session.process_input(Intent::JumpToSongId(1)).unwrap();
    session.process_input(Intent::JumpToSongId(3)).unwrap();
    wait_for(&mut states, |s| showing(s, 3, C_LENGTH) && s.playing).await;

    // One load for Start, one for the jump to `c`.
    assert_eq!(rig.calls().set_sources, 2);
    assert_eq!(rig.calls().prepares, 2);
}

#[tokio::test]
async fn jumping_to_an_unknown_song_does_nothing() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let mut states = created_and_started(&session).await;

    session.process_input(Intent::JumpToSongId(99)).unwrap();
    session.process_input(Intent::PreviousSong).unwrap();
    let state = wait_for(&mut states, |s| showing(s, 3, C_LENGTH) && s.playing).await;

    assert_eq!(state.song_title, "c");
    assert_eq!(rig.calls().set_sources, 2);
}

#[tokio::test]
async fn seeking_moves_the_elapsed_time() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let mut states = created_and_started(&session).await;

    session.process_input(Intent::SeekForward).unwrap();
    session.process_input(Intent::SeekForward).unwrap();
    wait_for(&mut states, |s| s.elapsed_time == Duration::from_secs(10)).await;

    session.process_input(Intent::SeekBackward).unwrap();
    wait_for(&mut states, |s| s.elapsed_time == Duration::from_secs(5)).await;

    session
        .process_input(Intent::SeekTo(Duration::from_secs(61)))
        .unwrap();
    let state = wait_for(&mut states, |s| s.elapsed_time == Duration::from_secs(61)).await;
    assert_eq!(state.elapsed_time_label, "01:01");

    // Past the end of the song lands at the start.
    session
        .process_input(Intent::SeekTo(Duration::from_secs(999)))
        .unwrap();
    wait_for(&mut states, |s| s.elapsed_time.is_zero()).await;
}

#[tokio::test]
async fn pause_and_play_toggle_playing() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let mut states = created_and_started(&session).await;

    session.process_input(Intent::Play).unwrap();
    wait_for(&mut states, |s| s.playing).await;
    assert!(rig.is_playing());

    session.process_input(Intent::Pause).unwrap();
    wait_for(&mut states, |s| !s.playing).await;
    assert!(!rig.is_playing());
}

#[tokio::test]
async fn completed_song_moves_to_the_next() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let mut states = created_and_started(&session).await;

    session.process_input(Intent::Play).unwrap();
    wait_for(&mut states, |s| s.playing).await;

    rig.complete();

    let state = wait_for(&mut states, |s| showing(s, 2, B_LENGTH) && s.playing).await;
    assert_eq!(state.song_title, "b");
}

#[tokio::test]
async fn rapid_song_changes_settle_on_the_last() {
    let rig = EngineRig::new();
    let session = start_session(&rig, abc(), quiet_config());
    let mut states = created_and_started(&session).await;

    session.process_input(Intent::NextSong).unwrap();
    session.process_input(Intent::NextSong).unwrap();

    let state = wait_for(&mut states, |s| showing(s, 3, C_LENGTH) && s.playing).await;
    assert_eq!(state.song_title, "c");
    assert_eq!(rig.source(), Some(PathBuf::from("media/c.mp3")));
}

#[tokio::test]
async fn playing_ticks_the_clock() {
    let rig = EngineRig::new();
    let config = SessionConfig {
        tick_interval: Duration::from_millis(10),
        ..SessionConfig::default()
    };
    let session = start_session(&rig, abc(), config);
    let mut states = created_and_started(&session).await;

    session.process_input(Intent::Play).unwrap();
    wait_for(&mut states, |s| s.playing).await;

    rig.advance(Duration::from_secs(7));
    let state = wait_for(&mut states, |s| s.elapsed_time == Duration::from_secs(7)).await;
    assert_eq!(state.elapsed_time_label, "00:07");
}

#[tokio::test]
async fn keep_screen_on_follows_playback() {
    let rig = EngineRig::new();
    let config = SessionConfig {
        keep_screen_on: true,
        ..quiet_config()
    };
    let session = start_session(&rig, abc(), config);
    let effects = session.side_effects();
    let mut states = created_and_started(&session).await;

    session.process_input(Intent::Play).unwrap();
    wait_for(&mut states, |s| s.playing).await;
    assert_eq!(
        timeout(WAIT, effects.next()).await.unwrap(),
        Some(SideEffect::KeepScreenOn(true))
    );

    // Playing again changes nothing and queues nothing.
    session.process_input(Intent::Play).unwrap();
    session.process_input(Intent::Pause).unwrap();
    wait_for(&mut states, |s| !s.playing).await;
    assert_eq!(
        timeout(WAIT, effects.next()).await.unwrap(),
        Some(SideEffect::KeepScreenOn(false))
    );
    assert_eq!(effects.try_next(), None);
}

#[tokio::test]
async fn empty_catalog_ends_the_session() {
    let rig = EngineRig::new();
    let session = start_session(&rig, Vec::new(), quiet_config());
    let mut states = session.view_states();

    session.process_input(Intent::Create).unwrap();

    let closed = timeout(WAIT, states.changed()).await.unwrap();
    assert!(closed.is_err());
    assert!(session.process_input(Intent::Start).is_err());
}
