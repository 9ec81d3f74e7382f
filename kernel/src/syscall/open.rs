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

//! The `open` system call (§4.6): resolve `path`, allocate an FD with
//! `read_pos = write_pos = 0`. Directories may be opened (for `list_dir`)
//! but byte I/O on the resulting FD is rejected by `read`/`write`.

use crate::device::BlockDevice;
use crate::fs::path;
use crate::log_error;
use crate::Kernel;
use utils::errno;
use utils::EResult;

pub fn open<D: BlockDevice>(kernel: &mut Kernel<D>, abs_path: &str) -> EResult<u32> {
	let inode = kernel.fs.resolve(abs_path).map_err(|e| {
		log_error!(kernel, "open: couldn't trace path");
		errno!(kernel.error, e, "open: couldn't trace path")
	})?;
	let (_, filename) = path::parse_path(abs_path).map_err(|e| {
		log_error!(kernel, "open: bad path");
		errno!(kernel.error, e, "open: bad path")
	})?;
	kernel.fds.allocate(filename, inode).map_err(|e| {
		log_error!(kernel, "open: fd table exhausted");
		errno!(kernel.error, e, "open: fd table exhausted")
	})
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;
	use crate::device::{RamBlockDevice, SerialPort};
	use crate::fs::FileType;
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

	#[test]
	fn open_missing_path_fails_and_records_error() {
		let mut serial = NullSerial;
		let mut kernel = Kernel::mount(RamBlockDevice::new(), true, &mut serial).unwrap();
		assert!(open(&mut kernel, "/missing").is_err());
		assert!(!kernel.error.message().is_empty());
	}

	#[test]
	fn open_directory_succeeds() {
		let mut serial = NullSerial;
		let mut kernel = Kernel::mount(RamBlockDevice::new(), true, &mut serial).unwrap();
		kernel.fs.create_filetype("/dir", FileType::Dir).unwrap();
		assert!(syscall::open(&mut kernel, "/dir").is_ok());
	}
}
