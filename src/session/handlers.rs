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

use std::time::Duration;

use crate::{
    actions::changes::{PartialStateChange, SongChange},
    error::Result,
    model::{Song, cursor::PlaylistCursor},
    player::worker::PlayerHandle,
    state::PlaylistItem,
};

pub(super) fn handle_create(cursor: &mut PlaylistCursor) -> Result<PartialStateChange> {
    let songs = cursor.load_default_playlist_songs()?;
    let playlist = songs.iter().map(PlaylistItem::from).collect();

    Ok(PartialStateChange::PlaylistLoaded { playlist })
}

/// Loads `song` and restores the playback position remembered by the view.
///
/// With both a remembered position and the playing flag set the song resumes
/// where it was, with only a position it is cued there, and with only the
/// playing flag it starts from the beginning.
pub(super) async fn handle_start(
    player: PlayerHandle,
    song: Option<Song>,
    was_playing: bool,
    elapsed: Duration,
) -> Result<Vec<PartialStateChange>> {
    let loaded = player.load_new_song(song.clone()).await?;
    let (true, Some(song)) = (loaded, song) else {
        return Ok(vec![PartialStateChange::Start(SongChange::failed())]);
    };

    let duration = player.duration().await?;
    let elapsed_ms = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);

    let playing = match (was_playing, elapsed_ms > 0) {
        (true, true) => player.seek_to_and_start(elapsed_ms).await?,
        (false, true) => {
            player.seek_to(elapsed_ms).await?;
            false
        }
        (true, false) => player.start().await?,
        (false, false) => false,
    };

    Ok(vec![PartialStateChange::Start(SongChange::loaded(
        song, duration, playing,
    ))])
}

// Pausing first silences the engine before the slower release.
pub(super) async fn handle_stop(player: PlayerHandle) -> Result<Vec<PartialStateChange>> {
    player.pause().await?;
    player.release().await?;

    Ok(vec![PartialStateChange::Stop])
}

pub(super) async fn handle_play(player: PlayerHandle) -> Result<Vec<PartialStateChange>> {
    let playing = player.start().await?;

    Ok(vec![PartialStateChange::Play { playing }])
}

pub(super) async fn handle_pause(player: PlayerHandle) -> Result<Vec<PartialStateChange>> {
    let paused = player.pause().await?;

    Ok(vec![PartialStateChange::Pause { playing: !paused }])
}

pub(super) async fn handle_seek_by(
    player: PlayerHandle,
    delta_ms: i64,
) -> Result<Vec<PartialStateChange>> {
    let position = player.seek_by(delta_ms).await?;

    Ok(vec![PartialStateChange::Seek { position }])
}

pub(super) async fn handle_seek_to(
    player: PlayerHandle,
    target: Duration,
) -> Result<Vec<PartialStateChange>> {
    let target_ms = i64::try_from(target.as_millis()).unwrap_or(i64::MAX);
    let position = player.seek_to(target_ms).await?;

    Ok(vec![PartialStateChange::Seek { position }])
}

pub(super) fn handle_position_tick(position: Duration) -> PartialStateChange {
    PartialStateChange::Tick { position }
}

/// The background half of the new-song sequence: load, then start.
///
/// A song that fails to load leaves the engine released, ready for the next
/// attempt.
pub(super) async fn handle_new_song(
    player: PlayerHandle,
    song: Song,
) -> Result<Vec<PartialStateChange>> {
    if player.load_new_song(Some(song.clone())).await? {
        let playing = player.start().await?;
        let duration = player.duration().await?;

        Ok(vec![PartialStateChange::NewSong(SongChange::loaded(
            song, duration, playing,
        ))])
    } else {
        player.release().await?;

        Ok(vec![PartialStateChange::NewSong(SongChange::failed())])
    }
}
