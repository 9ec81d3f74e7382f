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

//! `read_with_timeout` (§4.11): the shell's "receive a file over the
//! serial line" helper, lifted into the core since the inactivity timeout
//! itself is a testable property (P-IoTimeout, scenario 6), not something
//! specific to the shell.
//!
//! `ticks` stands in for the timer ISR's 100 Hz tick counter — a closure
//! rather than a direct read of kernel state, so this is host-testable
//! without a real timer.

use super::read;
use crate::device::{BlockDevice, SerialPort};
use crate::log_error;
use crate::Kernel;
use utils::errno;
use utils::errno::Errno;
use utils::EResult;

/// Polls `read` on `fd` until `buf` is full, resetting the deadline every
/// time at least one byte arrives, and fails with [`Errno::IoTimeout`]
/// once `timeout_ticks` pass with nothing received.
pub fn read_with_timeout<D: BlockDevice>(
	kernel: &mut Kernel<D>,
	fd: u32,
	buf: &mut [u8],
	serial: &mut dyn SerialPort,
	ticks: &dyn Fn() -> u64,
	timeout_ticks: u64,
) -> EResult<usize> {
	let mut total = 0usize;
	let mut deadline = ticks().saturating_add(timeout_ticks);
	while total < buf.len() {
		let n = read(kernel, fd, &mut buf[total..], serial)?;
		if n > 0 {
			total += n;
			deadline = ticks().saturating_add(timeout_ticks);
		} else if ticks() >= deadline {
			log_error!(kernel, "read_with_timeout: inactivity timeout");
			return Err(errno!(kernel.error, Errno::IoTimeout, "read_with_timeout: inactivity timeout"));
		}
	}
	Ok(total)
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;
	use crate::device::{RamBlockDevice, SerialPort};
	use crate::syscall;
	use core::cell::Cell;

	struct NullSerial {
		pending: std::vec::Vec<u8>,
	}
	impl SerialPort for NullSerial {
		fn rx_ready(&self) -> bool {
			!self.pending.is_empty()
		}
		fn tx_ready(&self) -> bool {
			true
		}
		fn read_byte(&mut self) -> u8 {
			self.pending.remove(0)
		}
		fn write_byte(&mut self, _b: u8) {}
		fn init(&mut self) {}
	}

	#[test]
	fn scenario6_timeout_fires_once_deadline_passes() {
		let mut serial = NullSerial {
			pending: std::vec::Vec::new(),
		};
		let mut kernel = Kernel::mount(RamBlockDevice::new(), true, &mut serial).unwrap();
		let fd = syscall::open(&mut kernel, "/dev/ttyS").unwrap();
		let clock = Cell::new(0u64);
		let ticks = || {
			let t = clock.get();
			clock.set(t + 1);
			t
		};
		let mut buf = [0u8; 4];
		let result = read_with_timeout(&mut kernel, fd, &mut buf, &mut serial, &ticks, 10);
		assert_eq!(result, Err(Errno::IoTimeout));
	}

	#[test]
	fn reads_available_bytes_without_timing_out() {
		let mut serial = NullSerial {
			pending: std::vec::Vec::new(),
		};
		let mut kernel = Kernel::mount(RamBlockDevice::new(), true, &mut serial).unwrap();
		let fd = syscall::open(&mut kernel, "/dev/ttyS").unwrap();
		serial.pending.extend_from_slice(b"hi");
		let ticks = || 0u64;
		let mut buf = [0u8; 2];
		let n = read_with_timeout(&mut kernel, fd, &mut buf, &mut serial, &ticks, 10).unwrap();
		assert_eq!(n, 2);
		assert_eq!(&buf, b"hi");
	}
}
