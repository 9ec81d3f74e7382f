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

//! The Yorha disk filesystem (C7, §4.6): superblock, bitmaps, inode table,
//! directory data blocks, and path resolution.
//!
//! File descriptors (C8, cursors) and special-file dispatch (C6, the
//! ring-buffer/terminal plane) are deliberately kept out of this module —
//! they live in [`crate::fd`] and [`crate::special`] respectively, and the
//! syscall layer ([`crate::syscall`]) is what wires the three together for
//! a given open FD.

pub mod dirent;
pub mod inode;
pub mod path;
pub mod superblock;

use crate::device::BlockDevice;
use crate::page::PAGE_SIZE;
use core::ops::{Deref, DerefMut};
use dirent::{DirEntry, DIRENT_SIZE, MAX_ENTRIES_PER_BLOCK};
pub use inode::FileType;
use inode::{Inode, INODE_SIZE};
use superblock::{Superblock, MAGIC};
use utils::any_repr;
use utils::errno::Errno;
use utils::EResult;

/// Total blocks on a freshly formatted disk (§3, §6).
pub const BLOCK_COUNT: u32 = 64;
/// Blocks occupied by the inode table (§6).
pub const INODE_TABLE_BLOCKS: u32 = 5;
/// Fixed block numbers from the on-disk layout table (§6).
pub const SUPER_BLOCK: u32 = 0;
pub const I_BMAP_BLOCK: u32 = 1;
pub const D_BMAP_BLOCK: u32 = 2;
pub const INODE_TABLE_START: u32 = 3;
pub const DATA_START: u32 = INODE_TABLE_START + INODE_TABLE_BLOCKS;

/// `5 blocks * 4096 bytes / 64-byte inode = 320` records (§3).
pub const MAX_INODES: usize = (INODE_TABLE_BLOCKS as usize * PAGE_SIZE as usize) / INODE_SIZE;
const I_BMAP_WORDS: usize = MAX_INODES / 32;
const D_BMAP_WORDS: usize = BLOCK_COUNT as usize / 32;

/// A 4 KiB block buffer, 8-byte aligned so it can be safely reinterpreted
/// as any on-disk record type (the widest field, `Superblock::disk_size`,
/// is a `u64`).
#[repr(align(8))]
struct Block([u8; PAGE_SIZE as usize]);

impl Block {
	fn zeroed() -> Self {
		Self([0; PAGE_SIZE as usize])
	}
}

impl Deref for Block {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		&self.0
	}
}

impl DerefMut for Block {
	fn deref_mut(&mut self) -> &mut [u8] {
		&mut self.0
	}
}

/// The mounted filesystem: superblock, both bitmaps, and the full inode
/// table held in RAM per §3's lifecycle ("read once into RAM at mount,
/// mutated in RAM, flushed to disk at shutdown").
pub struct Filesystem<D: BlockDevice> {
	dev: D,
	super_block: Superblock,
	i_bmap: [u32; I_BMAP_WORDS],
	d_bmap: [u32; D_BMAP_WORDS],
	inodes: [Inode; MAX_INODES],
}

impl<D: BlockDevice> Filesystem<D> {
	/// Mounts `dev`. Loads existing metadata if `force_format` is false
	/// and the on-disk magic is recognized; otherwise formats a fresh
	/// filesystem (§9: "format iff magic != Yorha", not a truthy
	/// `strcmp`).
	pub fn mount(dev: D, force_format: bool) -> EResult<Self> {
		let mut fs = Self {
			dev,
			super_block: Superblock::default(),
			i_bmap: [0; I_BMAP_WORDS],
			d_bmap: [0; D_BMAP_WORDS],
			inodes: [Inode::new(FileType::Normal); MAX_INODES],
		};
		let block0 = fs.read_block(SUPER_BLOCK)?;
		let existing = *any_repr::from_bytes::<Superblock>(&block0);
		if !force_format && existing.is_recognized() {
			fs.super_block = existing;
			fs.load_metadata()?;
		} else {
			fs.format()?;
		}
		Ok(fs)
	}

	fn read_block(&mut self, block_num: u32) -> EResult<Block> {
		let mut buf = Block::zeroed();
		self.dev.read_blocks(block_num, &mut buf, 1)?;
		Ok(buf)
	}

	fn write_block(&mut self, block_num: u32, buf: &Block) -> EResult<()> {
		self.dev.write_blocks(block_num, buf, 1)
	}

	fn load_metadata(&mut self) -> EResult<()> {
		let i_block = self.read_block(I_BMAP_BLOCK)?;
		self.i_bmap = *any_repr::from_bytes::<[u32; I_BMAP_WORDS]>(&i_block[..I_BMAP_WORDS * 4]);
		let d_block = self.read_block(D_BMAP_BLOCK)?;
		self.d_bmap = *any_repr::from_bytes::<[u32; D_BMAP_WORDS]>(&d_block[..D_BMAP_WORDS * 4]);
		let bytes = any_repr::as_bytes_mut(&mut self.inodes);
		self.dev.read_blocks(INODE_TABLE_START, bytes, INODE_TABLE_BLOCKS)?;
		Ok(())
	}

	/// Flushes superblock, inode bitmap, data bitmap, and inode table in
	/// that order (§4.6, §9). Called both at format time and shutdown.
	fn flush_metadata(&mut self) -> EResult<()> {
		let mut sb_block = Block::zeroed();
		let sb_bytes = any_repr::as_bytes(&self.super_block);
		sb_block[..sb_bytes.len()].copy_from_slice(sb_bytes);
		self.write_block(SUPER_BLOCK, &sb_block)?;

		let mut i_block = Block::zeroed();
		let i_bytes = any_repr::as_bytes(&self.i_bmap);
		i_block[..i_bytes.len()].copy_from_slice(i_bytes);
		self.write_block(I_BMAP_BLOCK, &i_block)?;

		let mut d_block = Block::zeroed();
		let d_bytes = any_repr::as_bytes(&self.d_bmap);
		d_block[..d_bytes.len()].copy_from_slice(d_bytes);
		self.write_block(D_BMAP_BLOCK, &d_block)?;

		let inode_bytes = any_repr::as_bytes(&self.inodes);
		self.dev.write_blocks(INODE_TABLE_START, inode_bytes, INODE_TABLE_BLOCKS)?;
		Ok(())
	}

	fn format(&mut self) -> EResult<()> {
		self.i_bmap = [0; I_BMAP_WORDS];
		self.d_bmap = [0; D_BMAP_WORDS];
		self.inodes = [Inode::new(FileType::Normal); MAX_INODES];

		crate::bitmap::apply_range(&mut self.d_bmap, 0, DATA_START, true);
		let root_data = crate::bitmap::alloc_range(&mut self.d_bmap, BLOCK_COUNT, 1, false);
		if root_data.is_empty() {
			return Err(Errno::Fatal);
		}
		crate::bitmap::apply_range(&mut self.i_bmap, 0, 1, true);

		let mut root = Inode::new(FileType::Dir);
		root.data_block_start = root_data.start;
		root.size = 0;
		root.parent_inode_num = 0;
		self.inodes[0] = root;
		self.write_block(root_data.start, &Block::zeroed())?;

		self.super_block = Superblock {
			magic: MAGIC,
			disk_size: self.dev.disk_size_bytes(),
			sector_count: BLOCK_COUNT * (PAGE_SIZE / 512),
			block_count: BLOCK_COUNT,
			i_bmap_start: I_BMAP_BLOCK,
			d_bmap_start: D_BMAP_BLOCK,
			inode_table_start: INODE_TABLE_START,
			data_start: DATA_START,
			used_inodes: 1,
		};
		self.flush_metadata()
	}

	/// Flushes metadata to disk. Does not close special files — the
	/// caller (`Kernel::shutdown`) does that first.
	pub fn shutdown(&mut self) -> EResult<()> {
		self.flush_metadata()
	}

	fn data_block(&mut self, inode_num: u32) -> EResult<Block> {
		self.read_block(self.inodes[inode_num as usize].data_block_start)
	}

	fn entry_count(&self, dir_inode: u32) -> usize {
		(self.inodes[dir_inode as usize].size as usize) / DIRENT_SIZE
	}

	/// Linear search of `dir_inode`'s single data block for `name`.
	fn find_in_dir(&mut self, dir_inode: u32, name: &str) -> EResult<u32> {
		let n = self.entry_count(dir_inode);
		let block = self.data_block(dir_inode)?;
		for i in 0..n {
			let bytes = &block[i * DIRENT_SIZE..(i + 1) * DIRENT_SIZE];
			let entry = any_repr::from_bytes::<DirEntry>(bytes);
			if entry.name_str() == name {
				return Ok(entry.inode_num);
			}
		}
		Err(Errno::BadPath)
	}

	/// Resolves an absolute path to a directory inode, descending one
	/// component at a time (§4.6). Fails if any component — including
	/// the final one — is not itself a directory.
	pub fn seek_directory(&mut self, abs_path: &str) -> EResult<u32> {
		if !abs_path.starts_with('/') {
			return Err(Errno::BadPath);
		}
		let mut current = 0u32;
		for component in path::components(abs_path) {
			if !self.inodes[current as usize].is_dir() {
				return Err(Errno::BadPath);
			}
			current = self.find_in_dir(current, component)?;
		}
		if !self.inodes[current as usize].is_dir() {
			return Err(Errno::BadPath);
		}
		Ok(current)
	}

	/// Resolves a file (or directory) path to its inode, for `open`.
	pub fn resolve(&mut self, abs_path: &str) -> EResult<u32> {
		let (dir_path, filename) = path::parse_path(abs_path)?;
		if filename.is_empty() {
			return self.seek_directory(abs_path);
		}
		let parent = self.seek_directory(dir_path)?;
		self.find_in_dir(parent, filename).map_err(|_| Errno::NoSuchFile)
	}

	/// Creates an inode of `file_type` at `path` (§4.6's
	/// `create_filetype`, minus FD allocation — the caller decides
	/// whether to also open an FD for the new inode).
	pub fn create_filetype(&mut self, path: &str, file_type: FileType) -> EResult<u32> {
		let (dir_path, filename) = path::parse_path(path)?;
		if filename.is_empty() {
			return Err(Errno::BadPath);
		}
		let parent = self.seek_directory(dir_path)?;
		if self.find_in_dir(parent, filename).is_ok() {
			return Err(Errno::AlreadyExists);
		}

		let inode_range = crate::bitmap::alloc_range(&mut self.i_bmap, MAX_INODES as u32, 1, false);
		if inode_range.is_empty() {
			return Err(Errno::NoSpace);
		}
		let file_inode_num = inode_range.start;

		let data_block_start = if file_type != FileType::Special {
			let data_range = crate::bitmap::alloc_range(&mut self.d_bmap, BLOCK_COUNT, 1, false);
			if data_range.is_empty() {
				crate::bitmap::apply_range(&mut self.i_bmap, file_inode_num, 1, false);
				return Err(Errno::NoSpace);
			}
			data_range.start
		} else {
			0
		};

		let mut inode = Inode::new(file_type);
		inode.set_name(filename);
		inode.data_block_start = data_block_start;
		inode.parent_inode_num = parent;
		self.inodes[file_inode_num as usize] = inode;

		if let Err(e) = self.append_dir_entry(parent, filename, file_inode_num) {
			crate::bitmap::apply_range(&mut self.i_bmap, file_inode_num, 1, false);
			if data_block_start != 0 {
				crate::bitmap::apply_range(&mut self.d_bmap, data_block_start, 1, false);
			}
			return Err(e);
		}

		if file_type == FileType::Dir {
			if let Err(e) = self.write_block(data_block_start, &Block::zeroed()) {
				self.remove_dir_entry(parent, filename).ok();
				crate::bitmap::apply_range(&mut self.i_bmap, file_inode_num, 1, false);
				crate::bitmap::apply_range(&mut self.d_bmap, data_block_start, 1, false);
				return Err(e);
			}
		}
		self.super_block.used_inodes += 1;
		Ok(file_inode_num)
	}

	fn append_dir_entry(&mut self, dir_inode: u32, name: &str, inode_num: u32) -> EResult<()> {
		let count = self.entry_count(dir_inode);
		if count >= MAX_ENTRIES_PER_BLOCK {
			return Err(Errno::NoSpace);
		}
		let mut block = self.data_block(dir_inode)?;
		let entry = DirEntry::new(name, inode_num);
		let offset = count * DIRENT_SIZE;
		block[offset..offset + DIRENT_SIZE].copy_from_slice(any_repr::as_bytes(&entry));
		let data_block_start = self.inodes[dir_inode as usize].data_block_start;
		self.write_block(data_block_start, &block)?;
		self.inodes[dir_inode as usize].size += DIRENT_SIZE as u32;
		Ok(())
	}

	/// Removes `name` from `dir_inode`'s entry list, if present, without
	/// touching any other state. Used both by `unlink` and to unwind a
	/// failed `create_filetype`.
	fn remove_dir_entry(&mut self, dir_inode: u32, name: &str) -> EResult<()> {
		let n = self.entry_count(dir_inode);
		let mut block = self.data_block(dir_inode)?;
		let found = (0..n).find(|&i| {
			let bytes = &block[i * DIRENT_SIZE..(i + 1) * DIRENT_SIZE];
			any_repr::from_bytes::<DirEntry>(bytes).name_str() == name
		});
		let Some(i) = found else {
			return Err(Errno::NoSuchFile);
		};
		// Shift the tail back by one, strictly below `n - 1` (§9: the
		// source's loop reads one past the end on its final iteration).
		let mut j = i;
		while j + 1 < n {
			block.copy_within((j + 1) * DIRENT_SIZE..(j + 2) * DIRENT_SIZE, j * DIRENT_SIZE);
			j += 1;
		}
		let last = (n - 1) * DIRENT_SIZE;
		block[last..last + DIRENT_SIZE].fill(0);
		let data_block_start = self.inodes[dir_inode as usize].data_block_start;
		self.write_block(data_block_start, &block)?;
		self.inodes[dir_inode as usize].size -= DIRENT_SIZE as u32;
		Ok(())
	}

	/// Resolves `path`, removes its entry from the parent directory, and
	/// frees its inode and (if any) data block (§4.6). No deletion
	/// propagation for non-empty directories — that is the caller's
	/// responsibility.
	pub fn unlink(&mut self, path: &str) -> EResult<()> {
		let (dir_path, filename) = path::parse_path(path)?;
		if filename.is_empty() {
			return Err(Errno::BadPath);
		}
		let parent = self.seek_directory(dir_path)?;
		let inode_num = self.find_in_dir(parent, filename).map_err(|_| Errno::NoSuchFile)?;
		self.remove_dir_entry(parent, filename)?;
		let data_block_start = self.inodes[inode_num as usize].data_block_start;
		if data_block_start != 0 {
			crate::bitmap::apply_range(&mut self.d_bmap, data_block_start, 1, false);
		}
		crate::bitmap::apply_range(&mut self.i_bmap, inode_num, 1, false);
		self.super_block.used_inodes -= 1;
		Ok(())
	}

	/// Reads up to `buf.len()` bytes from `inode_num`'s single data block
	/// starting at `pos`. Not valid for special files — the syscall
	/// layer checks `inode_kind` and dispatches those through
	/// [`crate::special`] instead.
	pub fn read_inode(&mut self, inode_num: u32, pos: u64, buf: &mut [u8]) -> EResult<usize> {
		let size = self.inodes[inode_num as usize].size as u64;
		if pos >= size {
			return Ok(0);
		}
		let n = (buf.len() as u64).min(size - pos) as usize;
		let block = self.data_block(inode_num)?;
		buf[..n].copy_from_slice(&block[pos as usize..pos as usize + n]);
		Ok(n)
	}

	/// Writes `data` into `inode_num`'s single data block starting at
	/// `pos`, capped at the block size. Per §4.6, `size` is *increased*
	/// by the bytes written rather than set to `pos + n` — this is the
	/// source's literal semantics, kept as specified (a known
	/// single-block-file simplification, §9, not something this core
	/// corrects).
	pub fn write_inode(&mut self, inode_num: u32, pos: u64, data: &[u8]) -> EResult<usize> {
		let mut block = self.data_block(inode_num)?;
		let available = (PAGE_SIZE as u64).saturating_sub(pos);
		let n = (data.len() as u64).min(available) as usize;
		block[pos as usize..pos as usize + n].copy_from_slice(&data[..n]);
		let data_block_start = self.inodes[inode_num as usize].data_block_start;
		self.write_block(data_block_start, &block)?;
		self.inodes[inode_num as usize].size += n as u32;
		Ok(n)
	}

	/// Writes `"{path}{entry_name}\n"` lines for every entry of the
	/// directory at `path` into `buf`, returning the bytes written.
	pub fn list_dir(&mut self, path: &str, buf: &mut [u8]) -> EResult<usize> {
		let dir_inode = self.seek_directory(path)?;
		let n = self.entry_count(dir_inode);
		let block = self.data_block(dir_inode)?;
		let mut written = 0usize;
		for i in 0..n {
			let bytes = &block[i * DIRENT_SIZE..(i + 1) * DIRENT_SIZE];
			let entry = any_repr::from_bytes::<DirEntry>(bytes);
			written += write_line(&mut buf[written..], path, entry.name_str())?;
		}
		Ok(written)
	}

	/// Same listing as [`Self::list_dir`], returned as an owned,
	/// newline-joined string with no trailing newline.
	pub fn str_list_dir(&mut self, path: &str) -> EResult<crate::kstring::KString> {
		let dir_inode = self.seek_directory(path)?;
		let n = self.entry_count(dir_inode);
		let block = self.data_block(dir_inode)?;
		let mut s = crate::kstring::KString::new();
		for i in 0..n {
			if i > 0 {
				s.push('\n');
			}
			let bytes = &block[i * DIRENT_SIZE..(i + 1) * DIRENT_SIZE];
			let entry = any_repr::from_bytes::<DirEntry>(bytes);
			s.push(path);
			s.push(entry.name_str());
		}
		Ok(s)
	}

	/// The file type of a live inode.
	pub fn inode_kind(&self, inode_num: u32) -> FileType {
		self.inodes[inode_num as usize].kind()
	}

	/// The stored `name` of a live inode (used by special-file dispatch,
	/// I8).
	pub fn inode_name(&self, inode_num: u32) -> &str {
		self.inodes[inode_num as usize].name_str()
	}

	/// The byte size of an ordinary file's single data block's contents.
	pub fn inode_size(&self, inode_num: u32) -> u32 {
		self.inodes[inode_num as usize].size
	}
}

fn write_line(out: &mut [u8], path: &str, name: &str) -> EResult<usize> {
	let needed = path.len() + name.len() + 1;
	if out.len() < needed {
		return Err(Errno::NoSpace);
	}
	out[..path.len()].copy_from_slice(path.as_bytes());
	out[path.len()..path.len() + name.len()].copy_from_slice(name.as_bytes());
	out[path.len() + name.len()] = b'\n';
	Ok(needed)
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;
	use crate::device::RamBlockDevice;

	fn fresh() -> Filesystem<RamBlockDevice> {
		Filesystem::mount(RamBlockDevice::new(), true).unwrap()
	}

	#[test]
	fn format_creates_root_directory() {
		let mut fs = fresh();
		assert!(fs.inodes[0].is_dir());
		assert_eq!(fs.super_block.used_inodes, 1);
		assert_eq!(fs.seek_directory("/").unwrap(), 0);
	}

	#[test]
	fn i3_metadata_blocks_permanently_allocated() {
		let fs = fresh();
		for b in 0..DATA_START {
			assert!(crate::bitmap::get_bit(&fs.d_bmap, b));
		}
	}

	#[test]
	fn scenario1_create_write_close_open_read() {
		let mut fs = fresh();
		let inode = fs.create_filetype("/hello", FileType::Normal).unwrap();
		assert_eq!(fs.write_inode(inode, 0, b"Hello\0").unwrap(), 6);
		let resolved = fs.resolve("/hello").unwrap();
		assert_eq!(resolved, inode);
		let mut buf = [0u8; 6];
		assert_eq!(fs.read_inode(resolved, 0, &mut buf).unwrap(), 6);
		assert_eq!(&buf, b"Hello\0");
	}

	#[test]
	fn scenario2_mkdir_create_list_unlink() {
		let mut fs = fresh();
		fs.create_filetype("/dir", FileType::Dir).unwrap();
		let file = fs.create_filetype("/dir/goodbye", FileType::Normal).unwrap();
		fs.write_inode(file, 0, b"bye\0").unwrap();

		let mut buf = [0u8; 64];
		let n = fs.list_dir("/dir/", &mut buf).unwrap();
		assert_eq!(&buf[..n], b"/dir/goodbye\n");

		fs.unlink("/dir/goodbye").unwrap();
		let n = fs.list_dir("/dir/", &mut buf).unwrap();
		assert_eq!(n, 0);
	}

	#[test]
	fn p6_create_unlink_idempotence_on_directory_size() {
		let mut fs = fresh();
		let before = fs.inodes[0].size;
		fs.create_filetype("/a", FileType::Normal).unwrap();
		fs.unlink("/a").unwrap();
		assert_eq!(fs.inodes[0].size, before);
	}

	#[test]
	fn scenario4_directory_capacity_113_then_fails() {
		let mut fs = fresh();
		for i in 0..MAX_ENTRIES_PER_BLOCK {
			let name = std::format!("/a{i}");
			fs.create_filetype(&name, FileType::Normal).unwrap();
		}
		let result = fs.create_filetype("/overflow", FileType::Normal);
		assert_eq!(result, Err(Errno::NoSpace));
	}

	#[test]
	fn p9_relative_path_rejected() {
		let mut fs = fresh();
		assert_eq!(fs.create_filetype("rel", FileType::Normal), Err(Errno::BadPath));
		assert_eq!(fs.resolve("rel"), Err(Errno::BadPath));
	}

	#[test]
	fn p9_missing_component_rejected() {
		let mut fs = fresh();
		assert_eq!(fs.resolve("/missing"), Err(Errno::NoSuchFile));
	}

	#[test]
	fn p9_mid_path_non_directory_rejected() {
		let mut fs = fresh();
		fs.create_filetype("/file", FileType::Normal).unwrap();
		assert_eq!(fs.resolve("/file/nested"), Err(Errno::BadPath));
	}

	#[test]
	fn create_duplicate_name_fails() {
		let mut fs = fresh();
		fs.create_filetype("/dup", FileType::Normal).unwrap();
		assert_eq!(fs.create_filetype("/dup", FileType::Normal), Err(Errno::AlreadyExists));
	}

	#[test]
	fn p5_persistence_across_remount() {
		let mut fs = fresh();
		fs.create_filetype("/persisted", FileType::Normal).unwrap();
		fs.shutdown().unwrap();
		let dev = fs.dev;
		let mut reopened = Filesystem::mount(dev, false).unwrap();
		assert!(reopened.resolve("/persisted").is_ok());
	}
}
