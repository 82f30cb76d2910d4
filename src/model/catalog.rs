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

//! Song catalog.
//!
//! The demo ships a small fixed catalog of bundled songs, there is no scanning
//! and nothing is persisted. Audio file names are resolved against the
//! configured media directory when the catalog is built.

use std::path::Path;

use crate::model::{Playlist, Song, SongId};

/// Source of the one playlist the player works with.
pub trait CatalogSource: Send + Sync {
    /// Returns the default playlist, expected to be non-empty.
    fn default_playlist(&self) -> Playlist;
}

struct CatalogEntry {
    id: SongId,
    title: &'static str,
    artist_name: &'static str,
    year: i32,
    album_art: &'static str,
    audio_file: &'static str,
}

const DEMO_SONGS: &[CatalogEntry] = &[
    CatalogEntry {
        id: 1,
        title: "Morning Static",
        artist_name: "The Long Wires",
        year: 2019,
        album_art: "art/morning_static.png",
        audio_file: "morning_static.mp3",
    },
    CatalogEntry {
        id: 2,
        title: "Paper Lanterns",
        artist_name: "Halcyon Drift",
        year: 2021,
        album_art: "art/paper_lanterns.png",
        audio_file: "paper_lanterns.mp3",
    },
    CatalogEntry {
        id: 3,
        title: "Undertow",
        artist_name: "Marrow & Vine",
        year: 2017,
        album_art: "art/undertow.png",
        audio_file: "undertow.mp3",
    },
    CatalogEntry {
        id: 4,
        title: "Glasshouse",
        artist_name: "Cedar Park",
        year: 2022,
        album_art: "art/glasshouse.png",
        audio_file: "glasshouse.mp3",
    },
    CatalogEntry {
        id: 5,
        title: "Northbound",
        artist_name: "The Long Wires",
        year: 2020,
        album_art: "art/northbound.png",
        audio_file: "northbound.mp3",
    },
];

/// Fixed in-memory catalog.
pub struct DemoCatalog {
    songs: Vec<Song>,
}

impl DemoCatalog {
    /// Builds the bundled catalog with audio files under `media_dir`.
    pub fn new(media_dir: impl AsRef<Path>) -> Self {
        let media_dir = media_dir.as_ref();

        let songs = DEMO_SONGS
            .iter()
            .map(|entry| Song {
                id: entry.id,
                title: entry.title.to_string(),
                artist_name: entry.artist_name.to_string(),
                year: entry.year,
                album_art: entry.album_art.to_string(),
                audio_file: media_dir.join(entry.audio_file),
            })
            .collect();

        Self { songs }
    }

    /// A catalog over an explicit list of songs.
    pub fn with_songs(songs: Vec<Song>) -> Self {
        Self { songs }
    }
}

impl CatalogSource for DemoCatalog {
    fn default_playlist(&self) -> Playlist {
        Playlist::new(self.songs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_catalog_resolves_media_dir() {
        let playlist = DemoCatalog::new("/srv/media").default_playlist();

        assert_eq!(playlist.len(), DEMO_SONGS.len());
        assert_eq!(
            playlist.songs[0].audio_file,
            Path::new("/srv/media/morning_static.mp3")
        );
    }

    #[test]
    fn demo_catalog_ids_are_unique() {
        let playlist = DemoCatalog::new("media").default_playlist();

        let mut ids: Vec<SongId> = playlist.songs.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), playlist.len());
    }
}
