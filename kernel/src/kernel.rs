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

//! Yorha: a small 32-bit single-processor teaching kernel core.
//!
//! This crate implements the persistent-storage and in-memory-resource
//! core described in `SPEC_FULL.md`: a bitmap range allocator, the Yorha
//! disk filesystem, and a character I/O plane feeding a VGA-style
//! terminal. Everything that would need real hardware access (GDT/IDT/PIC,
//! an ATA driver, VGA MMIO, a boot shim) is modeled only by the trait it
//! implements, in [`device`].

#![cfg_attr(not(test), no_std)]

pub mod bitmap;
pub mod device;
pub mod fd;
pub mod fs;
pub mod heap;
pub mod kstring;
pub mod logger;
pub mod page;
pub mod ring_buffer;
pub mod special;
pub mod syscall;
pub mod terminal;

use device::{BlockDevice, FramebufferSurface, SerialPort};
use fd::FileDescriptorTable;
use fs::Filesystem;
use logger::Logger;
use ring_buffer::RingBuffer;
use special::SpecialFileRegistry;
use terminal::Terminal;
use utils::errno::ErrorChannel;

/// The single kernel-context value: every piece of process-wide state the
/// core touches, grouped so that exactly one live instance exists (§9).
///
/// `D` is the block device backing the filesystem; it is the only piece
/// of hardware the core context needs a concrete type for, since every
/// operation routes through it synchronously.
pub struct Kernel<D: BlockDevice> {
	pub fs: Filesystem<D>,
	pub fds: FileDescriptorTable,
	pub terminal: Terminal,
	pub keyboard_ring: RingBuffer,
	pub serial_ring: RingBuffer,
	pub registry: SpecialFileRegistry,
	pub logger: Logger,
	pub error: ErrorChannel,
	/// 100 Hz tick counter, incremented by the (external) timer ISR.
	pub ticks: u64,
}

impl<D: BlockDevice> Kernel<D> {
	/// Mounts the filesystem on `dev` and brings up the special-file
	/// plane (§4.6, §4.5). `force_format` forces a fresh format even if
	/// the superblock magic already matches. `serial` is only touched to
	/// run `ttyS`'s own `init`.
	pub fn mount(dev: D, force_format: bool, serial: &mut dyn SerialPort) -> utils::EResult<Self> {
		let mut kernel = Self {
			fs: Filesystem::mount(dev, force_format)?,
			fds: FileDescriptorTable::new(),
			terminal: Terminal::new(),
			keyboard_ring: RingBuffer::new(),
			serial_ring: RingBuffer::new(),
			registry: SpecialFileRegistry::new(),
			logger: Logger::new(),
			error: ErrorChannel::new(),
			ticks: 0,
		};
		special::open_system_files(&mut kernel, serial)?;
		Ok(kernel)
	}

	/// Closes every special file, then flushes superblock, bitmaps, and
	/// inode table, in that order (§4.6).
	pub fn shutdown(&mut self) -> utils::EResult<()> {
		special::close_system_files(self)?;
		self.fs.shutdown()
	}

	/// Renders the terminal's current scrollback window to `fb` (§4.8).
	pub fn render_terminal(&mut self, fb: &mut dyn FramebufferSurface) {
		self.terminal.render(fb);
	}
}
