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

//! A directory's data block: a packed array of [`DirEntry`] (§3).

use crate::fs::inode::NAME_LEN;
use crate::page::PAGE_SIZE;
use macros::AnyRepr;

/// Byte size of one directory entry on disk.
pub const DIRENT_SIZE: usize = 36;

/// Maximum entries that fit in one 4 KiB directory data block
/// (`4096 / 36 = 113`, the hard cap from §3).
pub const MAX_ENTRIES_PER_BLOCK: usize = (PAGE_SIZE as usize) / DIRENT_SIZE;

/// One `{name, inode_num}` record in a directory's data block.
#[derive(Debug, Clone, Copy, AnyRepr)]
#[repr(C)]
pub struct DirEntry {
	pub name: [u8; NAME_LEN],
	pub inode_num: u32,
}

const _: () = assert!(core::mem::size_of::<DirEntry>() == DIRENT_SIZE);

impl DirEntry {
	pub fn new(name: &str, inode_num: u32) -> Self {
		let mut e = Self {
			name: [0; NAME_LEN],
			inode_num,
		};
		e.set_name(name);
		e
	}

	pub fn set_name(&mut self, name: &str) {
		self.name = [0; NAME_LEN];
		let bytes = name.as_bytes();
		let n = bytes.len().min(NAME_LEN);
		self.name[..n].copy_from_slice(&bytes[..n]);
	}

	pub fn name_str(&self) -> &str {
		let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
		core::str::from_utf8(&self.name[..end]).unwrap_or("")
	}
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;

	#[test]
	fn record_is_36_bytes() {
		assert_eq!(core::mem::size_of::<DirEntry>(), DIRENT_SIZE);
	}

	#[test]
	fn cap_is_113_entries() {
		assert_eq!(MAX_ENTRIES_PER_BLOCK, 113);
	}
}
