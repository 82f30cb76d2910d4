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

//! View state.
//!
//! The [`ViewState`] is the only thing a UI reads. A session never mutates a
//! published state, each fold step builds the next snapshot from the previous
//! one and a [`PartialStateChange`].

use std::time::Duration;

use crate::{
    actions::changes::{PartialStateChange, SongChange},
    model::{Song, SongId},
    util::format::format_time,
};

pub const PLACEHOLDER_TITLE: &str = "Loading...";
pub const PLACEHOLDER_INFO: &str = "";
pub const PLACEHOLDER_ART: &str = "placeholder";

/// A display-ready playlist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub id: SongId,
    pub title: String,
    pub subtitle: String,
    pub album_art: String,
}

impl From<&Song> for PlaylistItem {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id,
            title: song.title.clone(),
            subtitle: song.info_label(),
            album_art: song.album_art.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub loading: bool,
    pub playing: bool,
    pub song_title: String,
    pub song_info: String,
    pub album_art: String,
    pub total_duration: Duration,
    pub elapsed_time: Duration,
    pub total_duration_label: String,
    pub elapsed_time_label: String,
    pub current_song: Option<Song>,
    pub playlist: Vec<PlaylistItem>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            loading: true,
            playing: false,
            song_title: PLACEHOLDER_TITLE.to_string(),
            song_info: PLACEHOLDER_INFO.to_string(),
            album_art: PLACEHOLDER_ART.to_string(),
            total_duration: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            total_duration_label: format_time(0),
            elapsed_time_label: format_time(0),
            current_song: None,
            playlist: Vec::new(),
        }
    }
}

impl ViewState {
    /// Folds a single change into this state, producing the next one.
    pub fn reduce(&self, change: &PartialStateChange) -> ViewState {
        match change {
            PartialStateChange::PlaylistLoaded { playlist } => ViewState {
                playlist: playlist.clone(),
                ..self.clone()
            },
            PartialStateChange::Start(song_change) | PartialStateChange::NewSong(song_change) => {
                self.with_song(song_change)
            }
            PartialStateChange::Stop => self.clone(),
            PartialStateChange::Play { playing } | PartialStateChange::Pause { playing } => {
                ViewState {
                    playing: *playing,
                    ..self.clone()
                }
            }
            PartialStateChange::Seek { position } | PartialStateChange::Tick { position } => {
                ViewState {
                    elapsed_time: *position,
                    elapsed_time_label: format_time(position.as_secs()),
                    ..self.clone()
                }
            }
        }
    }

    pub fn current_song_id(&self) -> Option<SongId> {
        self.current_song.as_ref().map(|song| song.id)
    }

    /// Fraction of the song played so far, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.total_duration.is_zero() {
            return 0.0;
        }
        (self.elapsed_time.as_secs_f64() / self.total_duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn with_song(&self, change: &SongChange) -> ViewState {
        // A load that resolved without a song (failure, or a stale cursor)
        // must not touch what is displayed.
        let Some(song) = &change.song else {
            return self.clone();
        };

        let total_duration = change.duration.unwrap_or(self.total_duration);
        // Reloading the song on show keeps its position, another song starts
        // from the top.
        let elapsed_time = if self.current_song_id() == Some(song.id) {
            self.elapsed_time
        } else {
            Duration::ZERO
        };

        ViewState {
            loading: false,
            playing: change.playing,
            song_title: song.title.clone(),
            song_info: song.info_label(),
            album_art: song.album_art.clone(),
            total_duration,
            total_duration_label: format_time(total_duration.as_secs()),
            elapsed_time,
            elapsed_time_label: format_time(elapsed_time.as_secs()),
            current_song: Some(song.clone()),
            ..self.clone()
        }
    }
}
