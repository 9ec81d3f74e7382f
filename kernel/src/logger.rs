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

//! The kernel's in-memory log buffer (ambient stack — not a numbered
//! component, but carried the way the teacher crate always carries one;
//! see `SPEC_FULL.md` §2).
//!
//! If `silent` is set, logs are still kept but not meant to be echoed to
//! a visible surface (a serial console, say) by the caller.

use core::cmp::min;
use core::fmt;

/// Size of the in-memory log buffer, scaled down from the teacher's 1 MiB
/// for a teaching kernel whose other structures (bitmaps, inode table)
/// are kilobytes, not megabytes.
const LOG_BUF_SIZE: usize = 4096;

/// A ring-buffered log sink, structurally the same FIFO-over-array idea
/// as [`crate::ring_buffer::RingBuffer`] but sized for whole log lines
/// rather than single bytes, and allowed to overwrite its oldest bytes
/// rather than drop new ones.
pub struct Logger {
	pub silent: bool,
	buf: [u8; LOG_BUF_SIZE],
	read_head: usize,
	write_head: usize,
}

impl Logger {
	pub const fn new() -> Self {
		Self {
			silent: false,
			buf: [0; LOG_BUF_SIZE],
			read_head: 0,
			write_head: 0,
		}
	}

	fn available_space(&self) -> usize {
		if self.write_head >= self.read_head {
			LOG_BUF_SIZE - (self.write_head - self.read_head)
		} else {
			self.read_head - self.write_head - 1
		}
	}

	/// Drops the oldest `n` bytes to make room for new ones.
	fn pop(&mut self, n: usize) {
		self.read_head = (self.read_head + n) % LOG_BUF_SIZE;
	}

	/// Appends `s`, evicting the oldest bytes first if it would not
	/// otherwise fit.
	pub fn push(&mut self, s: &[u8]) {
		if self.available_space() < s.len() {
			self.pop(s.len() - self.available_space());
		}
		let len = min(self.available_space(), s.len());
		for (i, &b) in s[..len].iter().enumerate() {
			self.buf[(self.write_head + i) % LOG_BUF_SIZE] = b;
		}
		self.write_head = (self.write_head + len) % LOG_BUF_SIZE;
	}

	/// The raw backing buffer, for a caller that wants to dump the full
	/// log history regardless of ring position.
	pub fn raw(&self) -> &[u8] {
		&self.buf
	}
}

impl Default for Logger {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Write for Logger {
	fn write_str(&mut self, s: &str) -> fmt::Result {
		self.push(s.as_bytes());
		Ok(())
	}
}

/// Writes a formatted line into `$kernel.logger`, unless it is silenced.
#[macro_export]
macro_rules! log_info {
	($kernel:expr, $($arg:tt)*) => {{
		use core::fmt::Write;
		if !$kernel.logger.silent {
			let _ = write!($kernel.logger, $($arg)*);
			let _ = $kernel.logger.write_str("\n");
		}
	}};
}

/// Like [`log_info!`] but always written regardless of `silent` — errors
/// are never suppressed.
#[macro_export]
macro_rules! log_error {
	($kernel:expr, $($arg:tt)*) => {{
		use core::fmt::Write;
		let _ = write!($kernel.logger, $($arg)*);
		let _ = $kernel.logger.write_str("\n");
	}};
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;
	use core::fmt::Write;

	#[test]
	fn push_then_raw_contains_bytes() {
		let mut log = Logger::new();
		log.push(b"hello");
		assert_eq!(&log.raw()[..5], b"hello");
	}

	#[test]
	fn write_macro_trait_appends() {
		let mut log = Logger::new();
		write!(log, "n={}", 42).unwrap();
		assert_eq!(&log.raw()[..4], b"n=42");
	}

	#[test]
	fn overflow_evicts_oldest_bytes_without_panicking() {
		let mut log = Logger::new();
		log.push(&[b'a'; LOG_BUF_SIZE]);
		log.push(b"tail");
		assert!(log.available_space() <= LOG_BUF_SIZE - 1);
	}
}
