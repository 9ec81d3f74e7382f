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

//! Implementation of the `AnyRepr` derive macro.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Derives `AnyRepr` for a `#[repr(C)]` struct whose fields are themselves `AnyRepr`.
///
/// This only makes sense for plain-old-data structs: on-disk records
/// (superblock, inode, directory entry, file descriptor) that are read and
/// written as raw bytes and must be safe to reinterpret from any bit
/// pattern coming off the block device.
pub fn derive(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	let name = &input.ident;
	match &input.data {
		Data::Struct(data) => {
			if !matches!(data.fields, Fields::Named(_) | Fields::Unnamed(_)) {
				return syn::Error::new_spanned(&input, "AnyRepr requires a struct with fields")
					.to_compile_error()
					.into();
			}
		}
		_ => {
			return syn::Error::new_spanned(&input, "AnyRepr can only be derived for structs")
				.to_compile_error()
				.into();
		}
	}
	let expanded = quote! {
		unsafe impl utils::AnyRepr for #name {}
	};
	expanded.into()
}
