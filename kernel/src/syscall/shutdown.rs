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

//! The `shutdown` system call (§4.6): closes every special file, then
//! flushes superblock, inode bitmap, data bitmap, and inode table in that
//! order.

use crate::device::BlockDevice;
use crate::log_error;
use crate::Kernel;
use utils::errno;
use utils::EResult;

pub fn shutdown<D: BlockDevice>(kernel: &mut Kernel<D>) -> EResult<()> {
	kernel.shutdown().map_err(|e| {
		log_error!(kernel, "shutdown: metadata flush failed");
		errno!(kernel.error, e, "shutdown: metadata flush failed")
	})
}
