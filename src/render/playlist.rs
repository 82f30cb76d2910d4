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

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding},
};

use cadence::state::ViewState;

use crate::{render::icons::ICON_PLAY, theme::Theme};

/// Renders the playlist, marking the current song and highlighting the
/// selection.
pub(crate) fn draw_playlist(
    f: &mut Frame,
    area: Rect,
    view: &ViewState,
    selected: usize,
    theme: &Theme,
) {
    let current = view.current_song_id();

    let items: Vec<ListItem> = view
        .playlist
        .iter()
        .map(|item| {
            let marker = if Some(item.id) == current {
                format!(" {} ", ICON_PLAY)
            } else {
                "   ".to_string()
            };

            ListItem::new(Line::from(vec![
                Span::raw(marker).fg(theme.accent_colour),
                Span::styled(item.title.as_str(), Style::default().add_modifier(Modifier::BOLD))
                    .fg(theme.list_title_fg),
                Span::raw("  "),
                Span::raw(item.subtitle.as_str()).fg(theme.list_subtitle_fg),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Playlist ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_colour))
                .padding(Padding::horizontal(1)),
        )
        .highlight_style(Style::default().bg(theme.list_selected_bg));

    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}
