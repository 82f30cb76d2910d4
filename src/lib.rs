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

//! Cadence, a reactive music player core.
//!
//! A [`session::PlayerSession`] consumes [`actions::intents::Intent`]s and
//! publishes immutable [`state::ViewState`] snapshots, with one-shot
//! [`actions::effects::SideEffect`]s on the side. Playback goes through a
//! [`player::MediaSessionController`] wrapping a pluggable
//! [`player::engine::MediaEngine`], over songs provided by a
//! [`model::cursor::PlaylistCursor`].

pub mod actions;
pub mod config;
pub mod error;
pub mod model;
pub mod player;
pub mod session;
pub mod state;
pub mod tasks;
pub mod util;
