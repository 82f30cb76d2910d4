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

//! Render the now-playing panel.
//!
//! Everything shown here comes straight from the view state, including the
//! precomputed time labels.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph},
};

use cadence::state::ViewState;

use crate::{
    render::icons::{ICON_LOADING, ICON_PAUSE, ICON_PLAY},
    theme::Theme,
};

/// Renders the player widget: song, art reference, time labels and progress.
pub(crate) fn draw_player(f: &mut Frame, area: Rect, view: &ViewState, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(theme.border_colour))
        .padding(Padding::horizontal(1));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    let info_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(16)])
        .split(chunks[0]);

    let icon = if view.loading {
        ICON_LOADING
    } else if view.playing {
        ICON_PLAY
    } else {
        ICON_PAUSE
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);

    let song_line = Line::from(vec![
        Span::styled(format!(" {} ", icon), bold).fg(Color::White),
        Span::styled(view.song_title.as_str(), bold).fg(theme.accent_colour),
    ]);
    f.render_widget(Paragraph::new(song_line), info_chunks[0]);

    let time_line = Line::from(vec![
        Span::styled(view.elapsed_time_label.as_str(), bold).fg(theme.accent_colour),
        Span::styled(" / ", bold).fg(Color::White),
        Span::styled(view.total_duration_label.as_str(), bold).fg(theme.accent_colour),
    ]);
    f.render_widget(
        Paragraph::new(time_line).alignment(Alignment::Right),
        info_chunks[1],
    );

    let details = Line::from(vec![
        Span::raw("    "),
        Span::raw(view.song_info.as_str()).fg(Color::White),
        Span::raw("  "),
        Span::raw(format!("[{}]", view.album_art)).fg(theme.border_colour),
    ]);
    f.render_widget(Paragraph::new(details), chunks[1]);

    let position_gauge = Gauge::default()
        .gauge_style(
            Style::default()
                .fg(theme.accent_colour)
                .bg(theme.gauge_track_colour),
        )
        .ratio(view.progress())
        .label("")
        .use_unicode(true);

    f.render_widget(position_gauge, chunks[4]);
}
