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

//! User interface rendering logic.
//!
//! This module translates the latest [`ViewState`](cadence::state::ViewState)
//! held by the [`App`] into `ratatui` widgets. Nothing here talks to the
//! player, the UI only ever reads view states.

mod icons;
mod player;
mod playlist;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::{
    App,
    render::{
        icons::{ICON_ERROR, ICON_FF, ICON_NEXT, ICON_PREV, ICON_RW},
        player::draw_player,
        playlist::draw_playlist,
    },
};

/// Renders the user interface to the terminal frame.
///
/// The screen is split into the playlist, the now-playing panel and a status
/// line showing either the key help or the latest error.
pub(crate) fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.background_colour)),
        area,
    );

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(area);

    draw_playlist(f, outer[0], &app.view, app.selected, &app.theme);
    draw_player(f, outer[1], &app.view, &app.theme);
    draw_status(f, outer[2], app);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let line = match app.toast() {
        Some(message) => Line::from(vec![
            Span::raw(format!(" {} ", ICON_ERROR)).fg(app.theme.error_colour),
            Span::raw(message).fg(app.theme.error_colour),
        ]),
        None => Line::from(vec![
            Span::raw(format!(
                " space play/pause  {}/{} n/p  {}/{} \u{2190}/\u{2192}  enter jump  z {}  q quit",
                ICON_PREV,
                ICON_NEXT,
                ICON_RW,
                ICON_FF,
                if app.suspended { "resume" } else { "suspend" },
            ))
            .fg(app.theme.border_colour),
            Span::raw(if app.screen_on { "  [awake]" } else { "" }).fg(app.theme.accent_colour),
        ]),
    };

    f.render_widget(Paragraph::new(line), area);
}
