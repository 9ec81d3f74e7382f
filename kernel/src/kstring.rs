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

//! Owning strings and string splitting (§4.2).
//!
//! The source's `String{len,capacity,contents}` starts at capacity 2 and
//! doubles via `krealloc` whenever a push would overflow it (see
//! `include/alloc.h`'s `APPEND` macro). [`KString`] follows the same
//! growth policy, backed by [`crate::heap::ByteHeap`] instead of a raw
//! `kmalloc`/`krealloc` pair — there is no silent truncation; a string
//! only stops growing once the backing heap itself is out of space.

use crate::heap::{ByteHeap, HeapPtr};
use crate::page::PageAllocator;
use core::fmt;
use core::ops::Deref;
use utils::sync::Spin;

/// Capacity a freshly non-empty [`KString`] starts at, matching the
/// source's `APPEND` macro (`s.capacity = 2` on the first push).
const INITIAL_CAP: u32 = 2;

struct KStringHeap {
	#[allow(dead_code)]
	pages: PageAllocator,
	heap: ByteHeap,
}

/// The single page backing every `KString` in the process, lazily built on
/// first use and guarded by [`Spin`] — the bitmap/entries bookkeeping
/// inside [`ByteHeap`] is plain shared mutable state, not itself
/// synchronized.
static KSTRING_HEAP: Spin<Option<KStringHeap>> = Spin::new(None);

/// Runs `f` against the shared heap, initializing it on first use.
fn with_heap<R>(f: impl FnOnce(&mut ByteHeap) -> R) -> R {
	let mut guard = KSTRING_HEAP.lock();
	if guard.is_none() {
		let mut pages = PageAllocator::new();
		let heap = ByteHeap::new(&mut pages).expect("kstring heap: no pages available at boot");
		*guard = Some(KStringHeap { pages, heap });
	}
	f(&mut guard.as_mut().unwrap().heap)
}

/// Something that can append its bytes onto a [`KString`]. Implemented for
/// both `char` and `&str` so the same `push` works for either, matching
/// the source's dual-typed appender.
pub trait Appendable {
	fn append_to(&self, s: &mut KString);
}

impl Appendable for char {
	fn append_to(&self, s: &mut KString) {
		let mut buf = [0u8; 4];
		s.push_bytes(self.encode_utf8(&mut buf).as_bytes());
	}
}

impl Appendable for &str {
	fn append_to(&self, s: &mut KString) {
		s.push_bytes(self.as_bytes());
	}
}

/// A growable, owning byte buffer, doubling its backing allocation
/// whenever a push would overflow it.
pub struct KString {
	ptr: HeapPtr,
	cap: u32,
	len: usize,
}

impl KString {
	/// Creates an empty string. No heap allocation is made until the
	/// first byte is pushed.
	pub const fn new() -> Self {
		Self {
			ptr: HeapPtr(0),
			cap: 0,
			len: 0,
		}
	}

	/// Builds a `KString` from an existing byte slice.
	pub fn from_bytes(bytes: &[u8]) -> Self {
		let mut s = Self::new();
		s.push_bytes(bytes);
		s
	}

	/// Appends any [`Appendable`] value (a `char` or a `&str`).
	pub fn push(&mut self, value: impl Appendable) {
		value.append_to(self);
	}

	fn push_bytes(&mut self, bytes: &[u8]) {
		if bytes.is_empty() {
			return;
		}
		let needed = self.len + bytes.len();
		if needed as u32 > self.cap {
			let mut new_cap = self.cap.max(INITIAL_CAP);
			while (new_cap as usize) < needed {
				new_cap *= 2;
			}
			let new_ptr = with_heap(|heap| {
				if self.cap == 0 {
					heap.alloc(new_cap)
				} else {
					heap.realloc(self.ptr, new_cap)
				}
			})
			.expect("kstring heap exhausted");
			self.ptr = new_ptr;
			self.cap = new_cap;
		}
		with_heap(|heap| heap.write(HeapPtr(self.ptr.0 + self.len as u32), bytes));
		self.len += bytes.len();
	}

	/// The string's contents as a `&str`. Panics if the buffer does not
	/// hold valid UTF-8, which cannot happen through `push`/`from_bytes`
	/// alone unless constructed from arbitrary bytes.
	pub fn as_str(&self) -> &str {
		if self.len == 0 {
			return "";
		}
		let guard = KSTRING_HEAP.lock();
		let bytes = guard.as_ref().unwrap().heap.read(self.ptr, self.len as u32);
		// SAFETY: the backing storage is a 'static array that is never moved
		// or physically reused while this `KString` is alive — `free`/`realloc`
		// of *this* allocation requires `&mut self`, which cannot run
		// concurrently with this `&self` read. Dropping the guard here only
		// releases the bitmap/entries bookkeeping lock, not this byte range.
		let bytes: &[u8] = unsafe { core::slice::from_raw_parts(bytes.as_ptr(), bytes.len()) };
		drop(guard);
		core::str::from_utf8(bytes).unwrap_or("")
	}

	/// Number of bytes currently stored.
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}
}

impl Drop for KString {
	fn drop(&mut self) {
		if self.cap > 0 {
			with_heap(|heap| heap.free(self.ptr));
		}
	}
}

impl Clone for KString {
	fn clone(&self) -> Self {
		Self::from_bytes(self.as_str().as_bytes())
	}
}

impl Default for KString {
	fn default() -> Self {
		Self::new()
	}
}

impl Deref for KString {
	type Target = str;

	fn deref(&self) -> &str {
		self.as_str()
	}
}

impl fmt::Debug for KString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self.as_str(), f)
	}
}

/// Maximum number of fragments [`string_split`] will produce.
pub const MAX_SPLIT_FRAGMENTS: usize = 32;

/// Splits `input` on `delim`, returning up to [`MAX_SPLIT_FRAGMENTS`]
/// fragments. When `reserve_quotes` is set, `delim` occurrences inside a
/// pair of double quotes do not split (the quotes themselves are kept out
/// of the fragment). A trailing non-empty fragment is included even
/// without a final delimiter.
pub fn string_split(input: &str, delim: char, reserve_quotes: bool) -> ([KString; MAX_SPLIT_FRAGMENTS], usize) {
	let mut out: [KString; MAX_SPLIT_FRAGMENTS] = core::array::from_fn(|_| KString::new());
	let mut count = 0usize;
	let mut current = KString::new();
	let mut in_quotes = false;
	let mut any_in_current = false;

	let mut flush = |current: &mut KString, out: &mut [KString; MAX_SPLIT_FRAGMENTS], count: &mut usize| {
		if *count < MAX_SPLIT_FRAGMENTS {
			out[*count] = core::mem::replace(current, KString::new());
			*count += 1;
		}
	};

	for c in input.chars() {
		if reserve_quotes && c == '"' {
			in_quotes = !in_quotes;
			any_in_current = true;
			continue;
		}
		if c == delim && !(reserve_quotes && in_quotes) {
			flush(&mut current, &mut out, &mut count);
			any_in_current = false;
			continue;
		}
		current.push(c);
		any_in_current = true;
	}
	if any_in_current || current.len() > 0 {
		flush(&mut current, &mut out, &mut count);
	}
	(out, count)
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;

	#[test]
	fn push_char_and_str() {
		let mut s = KString::new();
		s.push('h');
		s.push("ello");
		assert_eq!(s.as_str(), "hello");
	}

	#[test]
	fn split_basic() {
		let (frags, n) = string_split("a,b,c", ',', false);
		assert_eq!(n, 3);
		assert_eq!(frags[0].as_str(), "a");
		assert_eq!(frags[1].as_str(), "b");
		assert_eq!(frags[2].as_str(), "c");
	}

	#[test]
	fn split_trailing_fragment_included() {
		let (frags, n) = string_split("a,b,", ',', false);
		assert_eq!(n, 2);
		assert_eq!(frags[0].as_str(), "a");
		assert_eq!(frags[1].as_str(), "b");
	}

	#[test]
	fn split_reserve_quotes_suppresses_split() {
		let (frags, n) = string_split(r#"a,"b,c",d"#, ',', true);
		assert_eq!(n, 3);
		assert_eq!(frags[0].as_str(), "a");
		assert_eq!(frags[1].as_str(), "b,c");
		assert_eq!(frags[2].as_str(), "d");
	}

	#[test]
	fn from_bytes_does_not_truncate_past_the_old_fixed_cap() {
		let data = [b'x'; 600];
		let s = KString::from_bytes(&data);
		assert_eq!(s.len(), 600);
		assert_eq!(s.as_str().len(), 600);
	}

	#[test]
	fn push_grows_capacity_by_doubling() {
		let mut s = KString::new();
		for _ in 0..20 {
			s.push('a');
		}
		assert_eq!(s.len(), 20);
		assert!(s.cap >= 20);
		assert_eq!(s.as_str(), "a".repeat(20));
	}

	#[test]
	fn clone_makes_an_independent_copy() {
		let mut a = KString::new();
		a.push("hello");
		let b = a.clone();
		a.push(" world");
		assert_eq!(a.as_str(), "hello world");
		assert_eq!(b.as_str(), "hello");
	}
}
