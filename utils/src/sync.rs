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

//! A minimal spinlock, used to guard the handful of process-wide globals
//! that are not threaded through the `Kernel` context (the `kstring`
//! module's shared byte heap).
//!
//! Unlike the teacher's `Spin<T, INT>`, this has no interrupt-disable
//! parameter: §5 only requires that, and only a caller that wants sharper
//! guarantees around a terminal render needs it. Everything else in this
//! design is single-threaded-main-loop plus lock-free ring buffers.

use core::cell::UnsafeCell;
use core::hint;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

/// A value protected by a spinlock.
pub struct Spin<T: ?Sized> {
	locked: AtomicBool,
	data: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send> Sync for Spin<T> {}

impl<T> Spin<T> {
	/// Creates a new, unlocked spinlock wrapping `data`.
	pub const fn new(data: T) -> Self {
		Self {
			locked: AtomicBool::new(false),
			data: UnsafeCell::new(data),
		}
	}
}

impl<T: ?Sized> Spin<T> {
	/// Locks the spinlock, busy-waiting until it is available.
	pub fn lock(&self) -> SpinGuard<'_, T> {
		while self
			.locked
			.compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
			.is_err()
		{
			hint::spin_loop();
		}
		SpinGuard { lock: self }
	}
}

/// RAII guard releasing a [`Spin`] lock when dropped.
pub struct SpinGuard<'a, T: ?Sized> {
	lock: &'a Spin<T>,
}

impl<T: ?Sized> Deref for SpinGuard<'_, T> {
	type Target = T;

	fn deref(&self) -> &T {
		unsafe { &*self.lock.data.get() }
	}
}

impl<T: ?Sized> DerefMut for SpinGuard<'_, T> {
	fn deref_mut(&mut self) -> &mut T {
		unsafe { &mut *self.lock.data.get() }
	}
}

impl<T: ?Sized> Drop for SpinGuard<'_, T> {
	fn drop(&mut self) {
		self.lock.locked.store(false, Ordering::Release);
	}
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;

	#[test]
	fn lock_unlock_roundtrip() {
		let s = Spin::new(0u32);
		*s.lock() += 1;
		*s.lock() += 1;
		assert_eq!(*s.lock(), 2);
	}
}
