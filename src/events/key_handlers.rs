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

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use cadence::actions::intents::Intent;

use crate::App;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

/// Maps keyboard input to intents for the player session.
///
/// Only list navigation is handled locally, everything else the user can do
/// is sent to the session as an intent.
pub(super) fn process_key_event(app: &mut App, key: KeyEvent) -> Result<Flow> {
    if key.kind != KeyEventKind::Press {
        return Ok(Flow::Continue);
    }

    let intent = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(Flow::Quit),

        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_previous();
            None
        }

        KeyCode::Char(' ') if app.view.playing => Some(Intent::Pause),
        KeyCode::Char(' ') => Some(Intent::Play),
        KeyCode::Char('n') => Some(Intent::NextSong),
        KeyCode::Char('p') => Some(Intent::PreviousSong),
        KeyCode::Left => Some(Intent::SeekBackward),
        KeyCode::Right => Some(Intent::SeekForward),
        KeyCode::Enter => app.selected_song_id().map(Intent::JumpToSongId),

        KeyCode::Char('z') => {
            app.suspended = !app.suspended;
            Some(if app.suspended {
                Intent::Stop
            } else {
                Intent::Start
            })
        }

        _ => None,
    };

    if let Some(intent) = intent {
        app.session.process_input(intent)?;
    }

    Ok(Flow::Continue)
}
