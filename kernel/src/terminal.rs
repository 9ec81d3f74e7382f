/*
 * This file is part of Yorha.
 *
 * Yorha is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Yorha is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
 * A PARTICULAR PURPOSE. See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Yorha. If not, see <https://www.gnu.org/licenses/>.
 */

//! The VGA text terminal (C9, §4.8): a scrollback ring rendered into a
//! character grid through [`FramebufferSurface`].

use crate::device::{FramebufferSurface, VgaCell};

/// Size of the scrollback ring, in bytes (§3).
pub const SCROLLBACK_SIZE: usize = 1024;
/// Columns in the rendered grid, matching the VGA text-mode width.
pub const TERMINAL_WIDTH: u16 = 80;
/// Visible lines kept on screen by the scroll algorithm (§4.8).
pub const TERMINAL_HEIGHT: u16 = 20;
/// Default character attribute: light grey on black, matching the VGA
/// text mode's conventional default color.
pub const DEFAULT_ATTR: u8 = 0x0f;

/// Byte value of a backspace, for [`Terminal::kputc`].
const BACKSPACE: u8 = 0x08;

/// A 1 KiB scrollback buffer plus the cursor state needed to render it
/// into an 80-column grid.
pub struct Terminal {
	scrollback: [u8; SCROLLBACK_SIZE],
	/// Write head: where the next appended byte lands.
	index: usize,
	/// Start of the currently rendered window.
	base_index: usize,
	total_written: u64,
	cursor_row: u16,
	cursor_col: u16,
}

impl Terminal {
	pub fn new() -> Self {
		Self {
			scrollback: [0; SCROLLBACK_SIZE],
			index: 0,
			base_index: 0,
			total_written: 0,
			cursor_row: 0,
			cursor_col: 0,
		}
	}

	/// Appends one byte to the scrollback ring (the `tty` write path,
	/// §4.5).
	pub fn append_byte(&mut self, b: u8) {
		self.scrollback[self.index] = b;
		self.index = (self.index + 1) % SCROLLBACK_SIZE;
		self.total_written += 1;
	}

	pub fn append(&mut self, bytes: &[u8]) {
		for &b in bytes {
			self.append_byte(b);
		}
	}

	/// The most recently appended byte, if any has been written yet.
	pub fn last_written_byte(&self) -> Option<u8> {
		if self.total_written == 0 {
			return None;
		}
		let idx = (self.index + SCROLLBACK_SIZE - 1) % SCROLLBACK_SIZE;
		Some(self.scrollback[idx])
	}

	/// Renders the window `[base_index, index)` onto `fb`, first
	/// advancing `base_index` if more than [`TERMINAL_HEIGHT`] newlines
	/// have accumulated since the last render (§4.8).
	pub fn render(&mut self, fb: &mut dyn FramebufferSurface) {
		let height = TERMINAL_HEIGHT as usize;
		let mut newline_ring = [0usize; TERMINAL_HEIGHT as usize];
		let mut count = 0usize;
		let mut pos = self.base_index;
		while pos != self.index {
			if self.scrollback[pos] == b'\n' {
				newline_ring[count % height] = pos;
				count += 1;
			}
			pos = (pos + 1) % SCROLLBACK_SIZE;
		}
		if count >= height {
			let oldest = newline_ring[count % height];
			self.base_index = (oldest + 1) % SCROLLBACK_SIZE;
		}

		for row in 0..TERMINAL_HEIGHT {
			for col in 0..TERMINAL_WIDTH {
				fb.put_cell(row, col, VgaCell::default());
			}
		}
		self.cursor_row = 0;
		self.cursor_col = 0;

		let mut pos = self.base_index;
		while pos != self.index {
			self.kputc(fb, self.scrollback[pos]);
			pos = (pos + 1) % SCROLLBACK_SIZE;
		}
	}

	/// Emits one character, advancing the cursor (§4.8): literal chars
	/// advance the column and wrap to the next row (wrapping the row
	/// back to 0 at the bottom); `\n` resets the column and advances the
	/// row; `\b` moves the column back, blanks the cell, and repositions
	/// the hardware cursor.
	fn kputc(&mut self, fb: &mut dyn FramebufferSurface, b: u8) {
		match b {
			b'\n' => {
				self.cursor_col = 0;
				self.advance_row();
			}
			BACKSPACE => {
				if self.cursor_col > 0 {
					self.cursor_col -= 1;
				}
				fb.put_cell(
					self.cursor_row,
					self.cursor_col,
					VgaCell {
						ch: b' ',
						attr: DEFAULT_ATTR,
					},
				);
			}
			ch => {
				fb.put_cell(self.cursor_row, self.cursor_col, VgaCell { ch, attr: DEFAULT_ATTR });
				self.cursor_col += 1;
				if self.cursor_col >= TERMINAL_WIDTH {
					self.cursor_col = 0;
					self.advance_row();
				}
			}
		}
		fb.set_cursor(self.cursor_row, self.cursor_col);
	}

	fn advance_row(&mut self) {
		self.cursor_row += 1;
		if self.cursor_row >= TERMINAL_HEIGHT {
			self.cursor_row = 0;
		}
	}
}

impl Default for Terminal {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;

	struct RecordingSurface {
		cells: [[VgaCell; TERMINAL_WIDTH as usize]; TERMINAL_HEIGHT as usize],
		cursor: (u16, u16),
	}

	impl RecordingSurface {
		fn new() -> Self {
			Self {
				cells: [[VgaCell::default(); TERMINAL_WIDTH as usize]; TERMINAL_HEIGHT as usize],
				cursor: (0, 0),
			}
		}
	}

	impl FramebufferSurface for RecordingSurface {
		fn put_cell(&mut self, row: u16, col: u16, cell: VgaCell) {
			self.cells[row as usize][col as usize] = cell;
		}

		fn set_cursor(&mut self, row: u16, col: u16) {
			self.cursor = (row, col);
		}
	}

	#[test]
	fn scenario5_write_x_visible_at_origin() {
		let mut term = Terminal::new();
		term.append(b"X");
		assert_eq!(term.last_written_byte(), Some(b'X'));
		let mut fb = RecordingSurface::new();
		term.render(&mut fb);
		assert_eq!(fb.cells[0][0].ch, b'X');
	}

	#[test]
	fn newline_advances_row_and_resets_column() {
		let mut term = Terminal::new();
		term.append(b"ab\ncd");
		let mut fb = RecordingSurface::new();
		term.render(&mut fb);
		assert_eq!(fb.cells[0][0].ch, b'a');
		assert_eq!(fb.cells[0][1].ch, b'b');
		assert_eq!(fb.cells[1][0].ch, b'c');
		assert_eq!(fb.cells[1][1].ch, b'd');
	}

	#[test]
	fn backspace_blanks_previous_cell() {
		let mut term = Terminal::new();
		term.append(b"ab");
		term.append_byte(BACKSPACE);
		let mut fb = RecordingSurface::new();
		term.render(&mut fb);
		assert_eq!(fb.cells[0][1].ch, b' ');
	}

	#[test]
	fn scrolls_once_more_than_height_lines_written() {
		let mut term = Terminal::new();
		for i in 0..(TERMINAL_HEIGHT as u32 + 5) {
			term.append(std::format!("line{i}\n").as_bytes());
		}
		let mut fb = RecordingSurface::new();
		term.render(&mut fb);
		// The oldest lines have scrolled off; line0 is no longer row 0.
		assert_ne!(fb.cells[0][0].ch, b'l');
	}
}
