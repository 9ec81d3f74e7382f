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

//! The `write` system call (§4.6): dispatches to the special-file registry
//! for a `SPECIAL` inode, otherwise read-modify-writes the inode's single
//! data block at `write_pos`, capped at 4096 bytes total (a deliberate
//! single-block-file simplification, §9).
//!
//! `fb`/`serial` are the two hardware surfaces a `SPECIAL` write might
//! need; an ordinary-file write never touches them.

use crate::device::{BlockDevice, FramebufferSurface, SerialPort};
use crate::fs::FileType;
use crate::log_error;
use crate::Kernel;
use crate::special;
use utils::errno;
use utils::EResult;

pub fn write<D: BlockDevice>(
	kernel: &mut Kernel<D>,
	fd: u32,
	buf: &[u8],
	fb: &mut dyn FramebufferSurface,
	serial: &mut dyn SerialPort,
) -> EResult<usize> {
	let inode = kernel.fds.inode_of(fd).map_err(|e| {
		log_error!(kernel, "write: bad file descriptor");
		errno!(kernel.error, e, "write: bad file descriptor")
	})?;
	if kernel.fs.inode_kind(inode) == FileType::Special {
		return special::write(kernel, inode, buf, fb, serial).map_err(|e| {
			log_error!(kernel, "write: special handler failed");
			errno!(kernel.error, e, "write: special handler failed")
		});
	}
	let pos = kernel.fds.write_pos(fd).map_err(|e| {
		log_error!(kernel, "write: bad file descriptor");
		errno!(kernel.error, e, "write: bad file descriptor")
	})?;
	let n = kernel.fs.write_inode(inode, pos, buf).map_err(|e| {
		log_error!(kernel, "write: I/O failure");
		errno!(kernel.error, e, "write: I/O failure")
	})?;
	kernel.fds.advance_write(fd, n as u64).ok();
	Ok(n)
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;
	use crate::device::{RamBlockDevice, VgaCell};
	use crate::syscall;

	struct NullSerial;
	impl SerialPort for NullSerial {
		fn rx_ready(&self) -> bool {
			false
		}
		fn tx_ready(&self) -> bool {
			true
		}
		fn read_byte(&mut self) -> u8 {
			0
		}
		fn write_byte(&mut self, _b: u8) {}
		fn init(&mut self) {}
	}

	struct NullSurface;
	impl FramebufferSurface for NullSurface {
		fn put_cell(&mut self, _row: u16, _col: u16, _cell: VgaCell) {}
		fn set_cursor(&mut self, _row: u16, _col: u16) {}
	}

	#[test]
	fn scenario5_tty_write_updates_terminal_and_vga() {
		let mut serial = NullSerial;
		let mut kernel = Kernel::mount(RamBlockDevice::new(), true, &mut serial).unwrap();
		let fd = syscall::open(&mut kernel, "/dev/tty").unwrap();
		let mut fb = NullSurface;
		let mut write_serial = NullSerial;
		write(&mut kernel, fd, b"X", &mut fb, &mut write_serial).unwrap();
		assert_eq!(kernel.terminal.last_written_byte(), Some(b'X'));
	}

	#[test]
	fn ordinary_write_increases_size() {
		let mut serial = NullSerial;
		let mut kernel = Kernel::mount(RamBlockDevice::new(), true, &mut serial).unwrap();
		let fd = syscall::create(&mut kernel, "/f").unwrap();
		let mut fb = NullSurface;
		let mut write_serial = NullSerial;
		let inode = kernel.fds.inode_of(fd).unwrap();
		write(&mut kernel, fd, b"abc", &mut fb, &mut write_serial).unwrap();
		assert_eq!(kernel.fs.inode_size(inode), 3);
	}
}
