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

//! The `read` system call (§4.6): dispatches to the special-file registry
//! for a `SPECIAL` inode, otherwise copies `min(count, size - read_pos)`
//! bytes from the inode's single data block and advances `read_pos`. `0`
//! means EOF on an ordinary file, "no byte ready" on a special one.

use crate::device::{BlockDevice, SerialPort};
use crate::fs::FileType;
use crate::log_error;
use crate::Kernel;
use crate::special;
use utils::errno;
use utils::EResult;

pub fn read<D: BlockDevice>(
	kernel: &mut Kernel<D>,
	fd: u32,
	buf: &mut [u8],
	serial: &mut dyn SerialPort,
) -> EResult<usize> {
	let inode = kernel.fds.inode_of(fd).map_err(|e| {
		log_error!(kernel, "read: bad file descriptor");
		errno!(kernel.error, e, "read: bad file descriptor")
	})?;
	if kernel.fs.inode_kind(inode) == FileType::Special {
		return special::read(kernel, inode, buf, serial).map_err(|e| {
			log_error!(kernel, "read: special handler failed");
			errno!(kernel.error, e, "read: special handler failed")
		});
	}
	let pos = kernel.fds.read_pos(fd).map_err(|e| {
		log_error!(kernel, "read: bad file descriptor");
		errno!(kernel.error, e, "read: bad file descriptor")
	})?;
	let n = kernel.fs.read_inode(inode, pos, buf).map_err(|e| {
		log_error!(kernel, "read: I/O failure");
		errno!(kernel.error, e, "read: I/O failure")
	})?;
	kernel.fds.advance_read(fd, n as u64).ok();
	Ok(n)
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;
	use crate::device::{RamBlockDevice, SerialPort};
	use crate::syscall;

	struct NullSerial {
		pending: std::vec::Vec<u8>,
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
		fn write_byte(&mut self, _b: u8) {}
		fn init(&mut self) {}
	}

	fn mounted() -> Kernel<RamBlockDevice> {
		let mut serial = NullSerial {
			pending: std::vec::Vec::new(),
		};
		Kernel::mount(RamBlockDevice::new(), true, &mut serial).unwrap()
	}

	#[test]
	fn zero_returned_at_eof() {
		let mut kernel = mounted();
		let fd = syscall::create(&mut kernel, "/f").unwrap();
		let mut buf = [0u8; 8];
		let mut serial = NullSerial {
			pending: std::vec::Vec::new(),
		};
		assert_eq!(read(&mut kernel, fd, &mut buf, &mut serial).unwrap(), 0);
	}

	#[test]
	fn tty_read_yields_queued_keyboard_bytes() {
		let mut kernel = mounted();
		kernel.keyboard_ring.push(b'z');
		let fd = syscall::open(&mut kernel, "/dev/tty").unwrap();
		let mut buf = [0u8; 4];
		let mut serial = NullSerial {
			pending: std::vec::Vec::new(),
		};
		let n = read(&mut kernel, fd, &mut buf, &mut serial).unwrap();
		assert_eq!(&buf[..n], b"z");
	}
}
