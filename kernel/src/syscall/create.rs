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

//! The `create` system call: `create_filetype(path, NORMAL, alloc_fd: true)`
//! (§4.6).

use crate::device::BlockDevice;
use crate::fs::{path, FileType};
use crate::log_error;
use crate::Kernel;
use utils::errno;
use utils::EResult;

pub fn create<D: BlockDevice>(kernel: &mut Kernel<D>, path: &str) -> EResult<u32> {
	let inode = kernel.fs.create_filetype(path, FileType::Normal).map_err(|e| {
		log_error!(kernel, "create: could not create file");
		errno!(kernel.error, e, "create: could not create file")
	})?;
	let (_, filename) = path::parse_path(path).map_err(|e| {
		log_error!(kernel, "create: bad path");
		errno!(kernel.error, e, "create: bad path")
	})?;
	kernel.fds.allocate(filename, inode).map_err(|e| {
		log_error!(kernel, "create: fd table exhausted");
		errno!(kernel.error, e, "create: fd table exhausted")
	})
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;
	use crate::device::RamBlockDevice;
	use crate::syscall;

	struct NullSerial;
	impl crate::device::SerialPort for NullSerial {
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

	#[test]
	fn create_allocates_fd_on_fresh_inode() {
		let mut serial = NullSerial;
		let mut kernel = Kernel::mount(RamBlockDevice::new(), true, &mut serial).unwrap();
		let fd = syscall::create(&mut kernel, "/hello").unwrap();
		assert!(kernel.fds.inode_of(fd).is_ok());
	}
}
