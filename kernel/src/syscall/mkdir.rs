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

//! The `mkdir` system call: `create_filetype(path, DIR, alloc_fd: false)`
//! (§4.6). No FD is returned; directories are entered through `open` for
//! `list_dir` purposes only.

use crate::device::BlockDevice;
use crate::fs::FileType;
use crate::log_error;
use crate::Kernel;
use utils::errno;
use utils::EResult;

pub fn mkdir<D: BlockDevice>(kernel: &mut Kernel<D>, path: &str) -> EResult<()> {
	kernel.fs.create_filetype(path, FileType::Dir).map(|_| ()).map_err(|e| {
		log_error!(kernel, "mkdir: could not create directory");
		errno!(kernel.error, e, "mkdir: could not create directory")
	})
}
