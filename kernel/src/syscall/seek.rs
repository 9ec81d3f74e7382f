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

//! The `seek(fd, offset, whence)` system call (§4.6, §9). Only the
//! three-argument form is implemented — the two-argument `(fd, pos)`
//! variant from an earlier source revision is not carried forward.

use crate::device::BlockDevice;
use crate::fd::Whence;
use crate::log_error;
use crate::Kernel;
use utils::errno;
use utils::EResult;

pub fn seek<D: BlockDevice>(kernel: &mut Kernel<D>, fd: u32, offset: i64, whence: Whence) -> EResult<u64> {
	let inode = kernel.fds.inode_of(fd).map_err(|e| {
		log_error!(kernel, "seek: bad file descriptor");
		errno!(kernel.error, e, "seek: bad file descriptor")
	})?;
	let file_size = kernel.fs.inode_size(inode) as u64;
	kernel.fds.seek(fd, offset, whence, file_size).map_err(|e| {
		log_error!(kernel, "seek: bad file descriptor");
		errno!(kernel.error, e, "seek: bad file descriptor")
	})
}
