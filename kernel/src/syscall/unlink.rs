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

//! The `unlink` system call (§4.6): removes the entry from its parent
//! directory and frees the file's inode and data bit. No deletion
//! propagation for non-empty directories.

use crate::device::BlockDevice;
use crate::log_error;
use crate::Kernel;
use utils::errno;
use utils::EResult;

pub fn unlink<D: BlockDevice>(kernel: &mut Kernel<D>, path: &str) -> EResult<()> {
	kernel.fs.unlink(path).map_err(|e| {
		log_error!(kernel, "unlink: could not remove entry");
		errno!(kernel.error, e, "unlink: could not remove entry")
	})
}
