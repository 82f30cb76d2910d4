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

//! Error types for the playback session.

use thiserror::Error;

/// Errors surfaced by the session pipeline and its handlers.
///
/// Engine failures never show up here, the media session controller converts
/// them to safe defaults at its boundary.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The catalog returned an empty default playlist.
    #[error("Default playlist is empty")]
    EmptyCatalog,

    /// The media session worker thread has gone away.
    #[error("Media session worker is unavailable")]
    PlayerUnavailable,

    /// The session pipeline is no longer accepting intents.
    #[error("Session is closed")]
    SessionClosed,
}

impl SessionError {
    /// Whether this error must terminate the session pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::EmptyCatalog)
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_empty_catalog_is_fatal() {
        assert!(SessionError::EmptyCatalog.is_fatal());
        assert!(!SessionError::PlayerUnavailable.is_fatal());
        assert!(!SessionError::SessionClosed.is_fatal());
    }
}
