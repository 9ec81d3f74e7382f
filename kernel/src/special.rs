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

//! The special-file registry (C6, §4.5): `/dev/tty` and `/dev/ttyS`.
//!
//! Both entries are `SPECIAL` inodes created under `/dev` at mount time,
//! each opened into its own FD. Reads and writes on an ordinary path never
//! reach this module — the syscall layer checks `inode_kind` first and
//! routes here only for `SPECIAL` inodes.
//!
//! `tty`'s read side drains [`crate::ring_buffer::RingBuffer`]
//! `keyboard_ring`, filled by the keyboard ISR (§5) — there is no direct
//! polling primitive for the keyboard controller in this crate, only the
//! ring. `ttyS`'s read side polls the UART's receive-ready bit directly,
//! one byte at a time, exactly as spec.md describes; `serial_ring` exists
//! for a future interrupt-driven UART but nothing in this crate's
//! production path fills it yet. The write side of `tty` appends to the
//! terminal scrollback and triggers a render; the write side of `ttyS`
//! polls the serial port's transmit-empty bit directly, since there is no
//! outgoing ring to decouple through either.

use crate::device::{BlockDevice, FramebufferSurface, SerialPort};
use crate::fs::FileType;
use crate::Kernel;
use utils::errno::Errno;
use utils::EResult;

/// `/dev`, created once at mount time and shared by every entry below.
const DEV_DIR: &str = "/dev";
const TTY_PATH: &str = "/dev/tty";
const TTYS_PATH: &str = "/dev/ttyS";

/// The live FDs of the two built-in special files, held so
/// [`close_system_files`] can close exactly what [`open_system_files`]
/// opened.
pub struct SpecialFileRegistry {
	tty_fd: Option<u32>,
	ttys_fd: Option<u32>,
}

impl SpecialFileRegistry {
	pub const fn new() -> Self {
		Self {
			tty_fd: None,
			ttys_fd: None,
		}
	}

	pub fn tty_fd(&self) -> Option<u32> {
		self.tty_fd
	}

	pub fn ttys_fd(&self) -> Option<u32> {
		self.ttys_fd
	}
}

impl Default for SpecialFileRegistry {
	fn default() -> Self {
		Self::new()
	}
}

/// Resolves `path`, creating it as `file_type` if its final component
/// isn't found yet — idempotent across a format-then-reopen within the
/// same process and across remounts of an already-formatted disk.
fn ensure_inode<D: BlockDevice>(kernel: &mut Kernel<D>, path: &str, file_type: FileType) -> EResult<u32> {
	match kernel.fs.resolve(path) {
		Ok(inode) => Ok(inode),
		Err(Errno::NoSuchFile) => kernel.fs.create_filetype(path, file_type),
		Err(e) => Err(e),
	}
}

/// Creates `/dev` and the `tty`/`ttyS` special inodes if missing, opens
/// each into its own FD, and calls each entry's own `init` with its own
/// FD (§9: the source only ever invoked the first entry's `init`).
pub fn open_system_files<D: BlockDevice>(kernel: &mut Kernel<D>, serial: &mut dyn SerialPort) -> EResult<()> {
	ensure_inode(kernel, DEV_DIR, FileType::Dir)?;

	let tty_inode = ensure_inode(kernel, TTY_PATH, FileType::Special)?;
	let tty_fd = kernel.fds.allocate("tty", tty_inode)?;
	kernel.registry.tty_fd = Some(tty_fd);

	let ttys_inode = ensure_inode(kernel, TTYS_PATH, FileType::Special)?;
	let ttys_fd = kernel.fds.allocate("ttyS", ttys_inode)?;
	serial.init();
	kernel.registry.ttys_fd = Some(ttys_fd);

	Ok(())
}

/// Closes every FD [`open_system_files`] opened.
pub fn close_system_files<D: BlockDevice>(kernel: &mut Kernel<D>) -> EResult<()> {
	if let Some(fd) = kernel.registry.tty_fd.take() {
		kernel.fds.close(fd)?;
	}
	if let Some(fd) = kernel.registry.ttys_fd.take() {
		kernel.fds.close(fd)?;
	}
	Ok(())
}

/// Dispatches a read on a `SPECIAL` inode, by name (§4.5). `true`/`false`
/// in the source's discriminator becomes two functions here instead.
/// `tty` drains the keyboard ring filled by the keyboard ISR; `ttyS`
/// polls the UART's receive-ready bit directly, one byte at a time, same
/// as the original — there is no incoming ring to decouple through on
/// the read side.
pub fn read<D: BlockDevice>(
	kernel: &mut Kernel<D>,
	inode_num: u32,
	buf: &mut [u8],
	serial: &mut dyn SerialPort,
) -> EResult<usize> {
	match kernel.fs.inode_name(inode_num) {
		"tty" => Ok(kernel.keyboard_ring.drain_into(buf)),
		"ttyS" => {
			let mut n = 0;
			while n < buf.len() && serial.rx_ready() {
				buf[n] = serial.read_byte();
				n += 1;
			}
			Ok(n)
		}
		_ => Err(Errno::Fatal),
	}
}

/// Dispatches a write on a `SPECIAL` inode, by name. `fb` and `serial`
/// are only touched by the entry that needs them.
pub fn write<D: BlockDevice>(
	kernel: &mut Kernel<D>,
	inode_num: u32,
	buf: &[u8],
	fb: &mut dyn FramebufferSurface,
	serial: &mut dyn SerialPort,
) -> EResult<usize> {
	match kernel.fs.inode_name(inode_num) {
		"tty" => {
			kernel.terminal.append(buf);
			kernel.terminal.render(fb);
			Ok(buf.len())
		}
		"ttyS" => {
			for &b in buf {
				while !serial.tx_ready() {}
				serial.write_byte(b);
			}
			Ok(buf.len())
		}
		_ => Err(Errno::Fatal),
	}
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;
	use crate::device::{RamBlockDevice, VgaCell};

	struct NullSerial {
		inited: bool,
		written: std::vec::Vec<u8>,
		pending: std::vec::Vec<u8>,
	}

	impl NullSerial {
		fn new() -> Self {
			Self {
				inited: false,
				written: std::vec::Vec::new(),
				pending: std::vec::Vec::new(),
			}
		}
	}

	impl SerialPort for NullSerial {
		fn rx_ready(&self) -> bool {
			!self.pending.is_empty()
		}
		fn tx_ready(&self) -> bool {
			true
		}
		fn read_byte(&mut self) -> u8 {
			self.pending.remove(0)
		}
		fn write_byte(&mut self, b: u8) {
			self.written.push(b);
		}
		fn init(&mut self) {
			self.inited = true;
		}
	}

	struct NullSurface;
	impl FramebufferSurface for NullSurface {
		fn put_cell(&mut self, _row: u16, _col: u16, _cell: VgaCell) {}
		fn set_cursor(&mut self, _row: u16, _col: u16) {}
	}

	fn mounted() -> (Kernel<RamBlockDevice>, NullSerial) {
		let mut serial = NullSerial::new();
		let kernel = Kernel::mount(RamBlockDevice::new(), true, &mut serial).unwrap();
		(kernel, serial)
	}

	#[test]
	fn open_system_files_creates_dev_entries_and_inits_ttys() {
		let (mut kernel, serial) = mounted();
		assert!(kernel.registry.tty_fd().is_some());
		assert!(kernel.registry.ttys_fd().is_some());
		assert!(serial.inited);
		assert!(kernel.fs.resolve("/dev/tty").is_ok());
		assert!(kernel.fs.resolve("/dev/ttyS").is_ok());
	}

	#[test]
	fn tty_write_appends_to_terminal_and_renders() {
		let (mut kernel, _serial) = mounted();
		let tty_inode = kernel.fs.resolve("/dev/tty").unwrap();
		let mut fb = NullSurface;
		let mut serial = NullSerial::new();
		write(&mut kernel, tty_inode, b"X", &mut fb, &mut serial).unwrap();
		assert_eq!(kernel.terminal.last_written_byte(), Some(b'X'));
	}

	#[test]
	fn ttys_write_polls_tx_ready_and_writes_bytes() {
		let (mut kernel, _serial) = mounted();
		let ttys_inode = kernel.fs.resolve("/dev/ttyS").unwrap();
		let mut fb = NullSurface;
		let mut serial = NullSerial::new();
		write(&mut kernel, ttys_inode, b"hi", &mut fb, &mut serial).unwrap();
		assert_eq!(serial.written, std::vec![b'h', b'i']);
	}

	#[test]
	fn tty_read_drains_keyboard_ring() {
		let (mut kernel, mut serial) = mounted();
		kernel.keyboard_ring.push(b'a');
		kernel.keyboard_ring.push(b'b');
		let tty_inode = kernel.fs.resolve("/dev/tty").unwrap();
		let mut buf = [0u8; 8];
		let n = read(&mut kernel, tty_inode, &mut buf, &mut serial).unwrap();
		assert_eq!(&buf[..n], b"ab");
	}

	#[test]
	fn ttys_read_polls_rx_ready_and_reads_bytes() {
		let (mut kernel, mut serial) = mounted();
		serial.pending.extend_from_slice(b"hi");
		let ttys_inode = kernel.fs.resolve("/dev/ttyS").unwrap();
		let mut buf = [0u8; 8];
		let n = read(&mut kernel, ttys_inode, &mut buf, &mut serial).unwrap();
		assert_eq!(&buf[..n], b"hi");
	}

	#[test]
	fn ttys_read_returns_zero_when_nothing_pending() {
		let (mut kernel, mut serial) = mounted();
		let ttys_inode = kernel.fs.resolve("/dev/ttyS").unwrap();
		let mut buf = [0u8; 8];
		let n = read(&mut kernel, ttys_inode, &mut buf, &mut serial).unwrap();
		assert_eq!(n, 0);
	}
}
