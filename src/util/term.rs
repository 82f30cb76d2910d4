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

//! Terminal background control through OSC escape sequences.
//!
//! Support depends on the terminal emulator, most modern ones (XTerm, iTerm2,
//! Alacritty, Kitty) understand these codes and the rest ignore them.

use std::io::{self, Write};

/// Sets the terminal background colour (OSC 11), e.g. `"#1e1e1e"`.
pub fn set_terminal_bg(hex_color: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\x1b]11;{}\x07", hex_color)?;
    stdout.flush()
}

/// Reverts the terminal background to the user's configuration (OSC 111).
pub fn reset_terminal_bg() -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\x1b]111\x07")?;
    stdout.flush()
}
