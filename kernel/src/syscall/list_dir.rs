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

//! The `list_dir` system call, in its two forms (§4.6): a caller-buffer
//! variant and one returning a freshly built [`crate::kstring::KString`].
//! Both fail if `path` does not resolve to a directory.

use crate::device::BlockDevice;
use crate::kstring::KString;
use crate::log_error;
use crate::Kernel;
use utils::errno;
use utils::EResult;

pub fn list_dir<D: BlockDevice>(kernel: &mut Kernel<D>, path: &str, buf: &mut [u8]) -> EResult<usize> {
	kernel.fs.list_dir(path, buf).map_err(|e| {
		log_error!(kernel, "list_dir: not a directory");
		errno!(kernel.error, e, "list_dir: not a directory")
	})
}

pub fn str_list_dir<D: BlockDevice>(kernel: &mut Kernel<D>, path: &str) -> EResult<KString> {
	kernel.fs.str_list_dir(path).map_err(|e| {
		log_error!(kernel, "list_dir: not a directory");
		errno!(kernel.error, e, "list_dir: not a directory")
	})
}
