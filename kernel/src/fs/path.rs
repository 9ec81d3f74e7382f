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

//! Path parsing (§4.6, §9).
//!
//! The source carries both a by-reference `parse_path` and a
//! heap-allocating `Path` type; per §9 this standardizes on the
//! non-allocating form, yielding slices of the caller's own string rather
//! than owned copies.

use utils::errno::Errno;
use utils::EResult;

/// Splits `path` into `(dir_path, filename)`: `dir_path` is everything
/// through the last slash inclusive, `filename` is the tail. The root
/// path's `dir_path` is `"/"` with an empty `filename`.
///
/// Fails with [`Errno::BadPath`] if `path` does not start with `/`
/// (relative paths are out of scope, per spec.md §1's non-goals).
pub fn parse_path(path: &str) -> EResult<(&str, &str)> {
	if !path.starts_with('/') {
		return Err(Errno::BadPath);
	}
	match path.rfind('/') {
		Some(idx) => Ok((&path[..=idx], &path[idx + 1..])),
		None => unreachable!("path starts with '/', rfind always finds it"),
	}
}

/// Iterates the non-empty `/`-delimited components of an absolute path,
/// e.g. `"/dir/goodbye"` → `["dir", "goodbye"]`.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
	path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;

	#[test]
	fn parse_root() {
		assert_eq!(parse_path("/").unwrap(), ("/", ""));
	}

	#[test]
	fn parse_top_level_file() {
		assert_eq!(parse_path("/hello").unwrap(), ("/", "hello"));
	}

	#[test]
	fn parse_nested_file() {
		assert_eq!(parse_path("/dir/goodbye").unwrap(), ("/dir/", "goodbye"));
	}

	#[test]
	fn relative_path_rejected() {
		assert_eq!(parse_path("dir/file"), Err(Errno::BadPath));
	}

	#[test]
	fn components_skip_empty_segments() {
		let c: std::vec::Vec<&str> = components("/dir/goodbye").collect();
		assert_eq!(c, std::vec!["dir", "goodbye"]);
	}
}
