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

//! Small `no_std` utilities shared by the kernel crate: error plumbing,
//! locking, and raw-byte reinterpretation of on-disk records.
//!
//! Kept deliberately small and free of `alloc`: every structure in this
//! kernel core is fixed-size (bitmaps, tables, ring buffers), so there is
//! no need for a heap-backed collections layer the way the teacher's
//! `utils` crate provides one — see `DESIGN.md`.

#![cfg_attr(not(test), no_std)]

pub mod any_repr;
pub mod errno;
pub mod sync;

pub use any_repr::AnyRepr;
pub use errno::{EResult, Errno};
