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

//! Derive macros for the Yorha kernel crate.

#![deny(warnings)]

extern crate proc_macro;

mod any_repr;

use proc_macro::TokenStream;

/// Derives `utils::AnyRepr` for a `#[repr(C)]` on-disk record, marking it safe
/// to reinterpret from raw bytes read off the block device.
#[proc_macro_derive(AnyRepr)]
pub fn derive_any_repr(input: TokenStream) -> TokenStream {
	any_repr::derive(input)
}
