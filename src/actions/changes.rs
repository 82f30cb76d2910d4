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

//! Partial state changes.
//!
//! Each handled intent produces zero or more of these deltas, which the
//! session folds into the view state in the order they are produced.

use std::time::Duration;

use crate::{model::Song, state::PlaylistItem};

/// Outcome of loading a song, shared by the start and new-song families.
#[derive(Debug, Clone, PartialEq)]
pub struct SongChange {
    /// The song to display. `None` leaves the displayed song untouched.
    pub song: Option<Song>,
    /// Total duration, `None` keeps the previously displayed one.
    pub duration: Option<Duration>,
    pub playing: bool,
    pub error_loading: bool,
}

impl SongChange {
    /// Immediate feedback for a song that is still loading.
    pub fn interim(song: Song) -> Self {
        Self {
            song: Some(song),
            duration: None,
            playing: false,
            error_loading: false,
        }
    }

    pub fn loaded(song: Song, duration: Duration, playing: bool) -> Self {
        Self {
            song: Some(song),
            duration: Some(duration),
            playing,
            error_loading: false,
        }
    }

    /// A failed load, which leaves the displayed song as it was.
    pub fn failed() -> Self {
        Self {
            song: None,
            duration: None,
            playing: false,
            error_loading: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartialStateChange {
    PlaylistLoaded { playlist: Vec<PlaylistItem> },
    Start(SongChange),
    NewSong(SongChange),
    Stop,
    Play { playing: bool },
    Pause { playing: bool },
    Seek { position: Duration },
    Tick { position: Duration },
}

impl PartialStateChange {
    /// The song-loading outcome carried by this change, if any.
    pub fn song_change(&self) -> Option<&SongChange> {
        match self {
            PartialStateChange::Start(change) | PartialStateChange::NewSong(change) => Some(change),
            _ => None,
        }
    }
}
