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

//! Marker trait for types safe to reinterpret from an arbitrary byte
//! pattern — on-disk records read straight off the block device.

use core::mem::size_of;
use core::slice;

/// Marks a `#[repr(C)]` type as valid for any bit pattern of its size, so a
/// raw block buffer can be reinterpreted as `&T`/`&mut T` without copying.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]` (or `#[repr(C, packed)]`), contain no
/// padding that would be observable, and every field must itself be
/// `AnyRepr`. Do not implement this by hand; derive it with
/// `#[derive(macros::AnyRepr)]`.
pub unsafe trait AnyRepr: Sized {}

unsafe impl AnyRepr for u8 {}
unsafe impl AnyRepr for u16 {}
unsafe impl AnyRepr for u32 {}
unsafe impl AnyRepr for u64 {}
unsafe impl AnyRepr for i8 {}
unsafe impl AnyRepr for i32 {}
unsafe impl<T: AnyRepr, const N: usize> AnyRepr for [T; N] {}

/// Reinterprets the first `size_of::<T>()` bytes of `bytes` as `&T`.
///
/// # Panics
///
/// Panics if `bytes` is too small or insufficiently aligned for `T`.
pub fn from_bytes<T: AnyRepr>(bytes: &[u8]) -> &T {
	assert!(bytes.len() >= size_of::<T>(), "buffer too small for type");
	let ptr = bytes.as_ptr() as *const T;
	assert_eq!(ptr as usize % core::mem::align_of::<T>(), 0, "misaligned buffer");
	unsafe { &*ptr }
}

/// Mutable counterpart of [`from_bytes`].
pub fn from_bytes_mut<T: AnyRepr>(bytes: &mut [u8]) -> &mut T {
	assert!(bytes.len() >= size_of::<T>(), "buffer too small for type");
	let ptr = bytes.as_mut_ptr() as *mut T;
	assert_eq!(ptr as usize % core::mem::align_of::<T>(), 0, "misaligned buffer");
	unsafe { &mut *ptr }
}

/// Views an `AnyRepr` value as its raw byte representation.
pub fn as_bytes<T: AnyRepr>(value: &T) -> &[u8] {
	unsafe { slice::from_raw_parts(value as *const T as *const u8, size_of::<T>()) }
}

/// Views an `AnyRepr` value as its mutable raw byte representation.
pub fn as_bytes_mut<T: AnyRepr>(value: &mut T) -> &mut [u8] {
	unsafe { slice::from_raw_parts_mut(value as *mut T as *mut u8, size_of::<T>()) }
}
