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

//! Playlist cursor.
//!
//! Tracks the current playlist and a position within it. Traversal is
//! circular, there is no end of list. Every operation on a cursor that has not
//! loaded a playlist yet returns `None` (or an empty slice) instead of
//! failing.

use std::sync::Arc;

use tracing::debug;

use crate::{
    error::{Result, SessionError},
    model::{Playlist, Song, SongId, catalog::CatalogSource},
};

pub struct PlaylistCursor {
    catalog: Arc<dyn CatalogSource>,
    playlist: Option<Playlist>,
    // Always in [0, len) while a playlist is loaded.
    position: usize,
}

impl PlaylistCursor {
    pub fn new(catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            catalog,
            playlist: None,
            position: 0,
        }
    }

    /// Fetches the default playlist from the catalog and rewinds to its first
    /// song.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyCatalog`] if the catalog has no songs,
    /// which is a packaging error rather than a runtime condition.
    pub fn load_default_playlist_songs(&mut self) -> Result<&[Song]> {
        let playlist = self.catalog.default_playlist();
        if playlist.is_empty() {
            return Err(SessionError::EmptyCatalog);
        }

        debug!(songs = playlist.len(), "Loaded default playlist");

        self.position = 0;
        let playlist = self.playlist.insert(playlist);

        Ok(&playlist.songs)
    }

    pub fn current_playlist(&self) -> &[Song] {
        self.playlist
            .as_ref()
            .map(|p| p.songs.as_slice())
            .unwrap_or_default()
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.playlist.as_ref()?.songs.get(self.position)
    }

    pub fn next_song(&mut self) -> Option<&Song> {
        let len = self.len()?;
        self.position = (self.position + 1) % len;

        self.current_song()
    }

    pub fn previous_song(&mut self) -> Option<&Song> {
        let len = self.len()?;
        self.position = if self.position == 0 {
            len - 1
        } else {
            self.position - 1
        };

        self.current_song()
    }

    /// The song after the current one, without moving the cursor.
    pub fn peek_next_song(&self) -> Option<&Song> {
        let playlist = self.playlist.as_ref()?;
        let len = playlist.len();
        if len == 0 {
            return None;
        }

        playlist.songs.get((self.position + 1) % len)
    }

    /// Moves to the song with the given id. Leaves the position untouched if
    /// there is no such song.
    pub fn jump_to_song_id(&mut self, id: SongId) -> Option<&Song> {
        let index = self
            .playlist
            .as_ref()?
            .songs
            .iter()
            .position(|song| song.id == id)?;

        self.position = index;

        self.current_song()
    }

    fn len(&self) -> Option<usize> {
        self.playlist
            .as_ref()
            .map(Playlist::len)
            .filter(|len| *len > 0)
    }
}
