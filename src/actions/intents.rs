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

use crate::model::SongId;

/// External requests fed into a player session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    // Lifecycle
    Create,
    Start,
    Stop,

    // Transport
    Play,
    Pause,
    NextSong,
    PreviousSong,
    SeekForward,
    SeekBackward,
    SeekTo(Duration),
    JumpToSongId(SongId),

    /// Periodic playback clock.
    PositionTick(Duration),
}

impl Intent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Create => "create",
            Intent::Start => "start",
            Intent::Stop => "stop",
            Intent::Play => "play",
            Intent::Pause => "pause",
            Intent::NextSong => "next_song",
            Intent::PreviousSong => "previous_song",
            Intent::SeekForward => "seek_forward",
            Intent::SeekBackward => "seek_backward",
            Intent::SeekTo(_) => "seek_to",
            Intent::JumpToSongId(_) => "jump_to_song_id",
            Intent::PositionTick(_) => "position_tick",
        }
    }
}
