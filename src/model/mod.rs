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

//! Catalog data model.
//!
//! Songs and playlists are created once when the catalog is loaded and never
//! mutated afterwards, everything downstream holds clones.

pub mod catalog;
pub mod cursor;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a song, unique within a catalog.
pub type SongId = i32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist_name: String,
    pub year: i32,
    /// Reference to the album art bundled with the song.
    pub album_art: String,
    /// Bundled audio file, already resolved against the media directory.
    pub audio_file: PathBuf,
}

impl Song {
    /// The secondary line shown under the title, "artist - year".
    pub fn info_label(&self) -> String {
        format!("{} - {}", self.artist_name, self.year)
    }
}

/// An ordered, immutable sequence of songs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub songs: Vec<Song>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    pub fn new(songs: Vec<Song>) -> Self {
        let now = Utc::now();
        Self {
            songs,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
