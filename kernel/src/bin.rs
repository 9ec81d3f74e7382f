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

//! `yorha-sim`: a host-side driver for the kernel core, backing the block
//! device with a regular file, the terminal with stdout, and the serial
//! port with stdin/stdout. Exercises the same `kernel` library a bare-metal
//! boot shim would, without needing GDT/IDT/PIC/ATA/VGA/boot at all.

use kernel::device::{BlockDevice, FramebufferSurface, SerialPort, VgaCell};
use kernel::fd::Whence;
use kernel::fs::BLOCK_COUNT;
use kernel::page::PAGE_SIZE;
use kernel::Kernel;
use kernel::syscall;
use std::env;
use std::fs::OpenOptions;
use std::io::{self, BufRead, Read as IoRead, Seek, SeekFrom, Write as IoWrite};

/// A [`BlockDevice`] backed by a host file, sized to exactly
/// `BLOCK_COUNT` blocks.
struct FileBlockDevice {
	file: std::fs::File,
}

impl FileBlockDevice {
	fn open(path: &str) -> io::Result<Self> {
		let file = OpenOptions::new().read(true).write(true).create(true).open(path)?;
		let wanted = BLOCK_COUNT as u64 * PAGE_SIZE as u64;
		if file.metadata()?.len() < wanted {
			file.set_len(wanted)?;
		}
		Ok(Self { file })
	}
}

impl BlockDevice for FileBlockDevice {
	fn read_blocks(&mut self, block_num: u32, buf: &mut [u8], count: u32) -> utils::EResult<()> {
		let offset = block_num as u64 * PAGE_SIZE as u64;
		let len = count as usize * PAGE_SIZE as usize;
		self.file.seek(SeekFrom::Start(offset)).map_err(|_| utils::Errno::Fatal)?;
		self.file.read_exact(&mut buf[..len]).map_err(|_| utils::Errno::Fatal)
	}

	fn write_blocks(&mut self, block_num: u32, buf: &[u8], count: u32) -> utils::EResult<()> {
		let offset = block_num as u64 * PAGE_SIZE as u64;
		let len = count as usize * PAGE_SIZE as usize;
		self.file.seek(SeekFrom::Start(offset)).map_err(|_| utils::Errno::Fatal)?;
		self.file.write_all(&buf[..len]).map_err(|_| utils::Errno::Fatal)
	}

	fn disk_size_bytes(&self) -> u64 {
		BLOCK_COUNT as u64 * PAGE_SIZE as u64
	}
}

/// Prints the VGA grid to stdout and the UART to stdout as well — there is
/// only one console on a host terminal, so both collaborator traits share
/// it.
struct Console;

impl FramebufferSurface for Console {
	fn put_cell(&mut self, _row: u16, _col: u16, _cell: VgaCell) {
		// The host console can't address individual cells; `kputc`'s
		// wrap/backspace bookkeeping still runs, only the visible echo
		// is skipped here.
	}

	fn set_cursor(&mut self, _row: u16, _col: u16) {}
}

impl SerialPort for Console {
	fn rx_ready(&self) -> bool {
		false
	}

	fn tx_ready(&self) -> bool {
		true
	}

	fn read_byte(&mut self) -> u8 {
		0
	}

	fn write_byte(&mut self, b: u8) {
		print!("{}", b as char);
		let _ = io::stdout().flush();
	}

	fn init(&mut self) {}
}

fn main() {
	let disk_path = env::args().nth(1).unwrap_or_else(|| "yorha.img".to_string());
	let force_format = env::args().any(|a| a == "--format");
	let dev = FileBlockDevice::open(&disk_path).expect("could not open disk image");
	let mut serial = Console;
	let mut kernel = Kernel::mount(dev, force_format, &mut serial).expect("mount failed");

	println!("yorha-sim: mounted {disk_path}");
	run_repl(&mut kernel);
}

/// A line-oriented shell exercising the syscall surface: `create`,
/// `mkdir`, `open`, `read`, `write`, `seek`, `unlink`, `list`, `shutdown`,
/// `exit`.
fn run_repl(kernel: &mut Kernel<FileBlockDevice>) {
	let stdin = io::stdin();
	for line in stdin.lock().lines() {
		let Ok(line) = line else { break };
		let mut parts = line.split_whitespace();
		let Some(cmd) = parts.next() else { continue };
		let result = dispatch(kernel, cmd, &mut parts);
		if let Err(e) = result {
			println!("error: {e} ({})", kernel.error.message());
		}
		if cmd == "exit" {
			break;
		}
	}
}

fn dispatch<'a>(
	kernel: &mut Kernel<FileBlockDevice>,
	cmd: &str,
	args: &mut impl Iterator<Item = &'a str>,
) -> utils::EResult<()> {
	match cmd {
		"create" => {
			let path = args.next().ok_or(utils::Errno::BadPath)?;
			let fd = syscall::create(kernel, path)?;
			println!("created fd {fd}");
		}
		"mkdir" => {
			let path = args.next().ok_or(utils::Errno::BadPath)?;
			syscall::mkdir(kernel, path)?;
			println!("ok");
		}
		"open" => {
			let path = args.next().ok_or(utils::Errno::BadPath)?;
			let fd = syscall::open(kernel, path)?;
			println!("fd {fd}");
		}
		"close" => {
			let fd: u32 = args.next().and_then(|s| s.parse().ok()).ok_or(utils::Errno::BadFd)?;
			syscall::close(kernel, fd)?;
			println!("ok");
		}
		"read" => {
			let fd: u32 = args.next().and_then(|s| s.parse().ok()).ok_or(utils::Errno::BadFd)?;
			let mut buf = [0u8; 4096];
			let mut serial = Console;
			let n = syscall::read(kernel, fd, &mut buf, &mut serial)?;
			println!("{} bytes: {:?}", n, &buf[..n]);
		}
		"write" => {
			let fd: u32 = args.next().and_then(|s| s.parse().ok()).ok_or(utils::Errno::BadFd)?;
			let text: std::string::String = args.collect::<std::vec::Vec<_>>().join(" ");
			let mut fb = Console;
			let mut serial = Console;
			let n = syscall::write(kernel, fd, text.as_bytes(), &mut fb, &mut serial)?;
			println!("wrote {n} bytes");
		}
		"seek" => {
			let fd: u32 = args.next().and_then(|s| s.parse().ok()).ok_or(utils::Errno::BadFd)?;
			let offset: i64 = args.next().and_then(|s| s.parse().ok()).ok_or(utils::Errno::BadFd)?;
			let whence = match args.next() {
				Some("cur") => Whence::Cur,
				Some("end") => Whence::End,
				_ => Whence::Set,
			};
			let pos = syscall::seek(kernel, fd, offset, whence)?;
			println!("pos {pos}");
		}
		"unlink" => {
			let path = args.next().ok_or(utils::Errno::BadPath)?;
			syscall::unlink(kernel, path)?;
			println!("ok");
		}
		"list" => {
			let path = args.next().unwrap_or("/");
			let s = syscall::str_list_dir(kernel, path)?;
			println!("{}", s.as_str());
		}
		"shutdown" | "exit" => {
			syscall::shutdown(kernel)?;
			println!("ok");
		}
		_ => println!("unknown command: {cmd}"),
	}
	Ok(())
}
