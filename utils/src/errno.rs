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

//! Error kinds and the process-wide error channel.
//!
//! Every fallible core operation returns [`EResult`]. Recoverable kinds
//! populate the [`ErrorChannel`] and return `Err`; [`Errno::Fatal`] is
//! reserved for state-machine violations (use-before-init, invariant
//! breaks) and is handled by the caller choosing to panic, not by this
//! module.

use core::fmt;

/// The size of the error message buffer, in bytes.
const ERROR_MSG_LEN: usize = 128;

/// The kind of a recoverable or fatal kernel error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
	/// Relative path given, resolution failed, or a non-final directory
	/// component is not a directory.
	BadPath,
	/// `create`/`mkdir` on a name that already has a sibling.
	AlreadyExists,
	/// A bitmap allocation (inode, data block, or FD) returned a
	/// zero-length range.
	NoSpace,
	/// `open`/`unlink` on a path whose final component was not found.
	NoSuchFile,
	/// `seek` (or any FD operation) on an FD whose bit is clear.
	BadFd,
	/// Inactivity beyond the read timeout.
	IoTimeout,
	/// A state-machine invariant was violated: allocator used before
	/// init, heap-free of an unknown pointer, maximum allocations
	/// reached. Callers are expected to panic after observing this.
	Fatal,
}

impl Errno {
	/// Returns a short, human-readable description of the error kind.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::BadPath => "bad path",
			Self::AlreadyExists => "already exists",
			Self::NoSpace => "no space left",
			Self::NoSuchFile => "no such file",
			Self::BadFd => "bad file descriptor",
			Self::IoTimeout => "I/O timeout",
			Self::Fatal => "fatal error",
		}
	}
}

impl fmt::Display for Errno {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The result type returned by every fallible core operation.
pub type EResult<T> = Result<T, Errno>;

/// The process-wide last-error buffer, formatted as
/// `"<file>:<line>: error: <text>"` at every fallible return (§4.9, §7).
///
/// Owned by [`crate::kernel::Kernel`] as part of the single kernel-context
/// value; never a free-standing global.
pub struct ErrorChannel {
	buf: [u8; ERROR_MSG_LEN],
	len: usize,
}

impl ErrorChannel {
	/// Creates an empty error channel.
	pub const fn new() -> Self {
		Self {
			buf: [0; ERROR_MSG_LEN],
			len: 0,
		}
	}

	/// Records `text` as the last error, tagged with the call site
	/// `file:line`. Truncates silently if the formatted message does not
	/// fit in the 128-byte buffer.
	pub fn set(&mut self, file: &str, line: u32, text: &str) {
		let mut w = ByteWriter {
			buf: &mut self.buf,
			pos: 0,
		};
		let _ = write_location(&mut w, file, line, text);
		self.len = w.pos;
	}

	/// Returns the last recorded error message, or the empty string if
	/// none has been recorded yet.
	pub fn message(&self) -> &str {
		core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
	}
}

impl Default for ErrorChannel {
	fn default() -> Self {
		Self::new()
	}
}

struct ByteWriter<'b> {
	buf: &'b mut [u8],
	pos: usize,
}

impl fmt::Write for ByteWriter<'_> {
	fn write_str(&mut self, s: &str) -> fmt::Result {
		let remaining = self.buf.len() - self.pos;
		let n = remaining.min(s.len());
		self.buf[self.pos..self.pos + n].copy_from_slice(&s.as_bytes()[..n]);
		self.pos += n;
		Ok(())
	}
}

fn write_location(w: &mut ByteWriter, file: &str, line: u32, text: &str) -> fmt::Result {
	use fmt::Write;
	write!(w, "{file}:{line}: error: {text}")
}

/// Records an error at the current call site in `$chan` (an
/// [`ErrorChannel`]) and evaluates to `$kind`, so it can be used directly
/// as the payload of an `Err(...)`.
///
/// ```ignore
/// return Err(errno!(self.error, Errno::NoSpace, "inode bitmap exhausted"));
/// ```
#[macro_export]
macro_rules! errno {
	($chan:expr, $kind:expr, $text:expr) => {{
		$chan.set(file!(), line!(), $text);
		$kind
	}};
}
