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

//! Bitmap range allocator (§4.1).
//!
//! The common primitive behind the kernel heap, the page allocator, and
//! inode/data-block/FD allocation: a first-fit scanner over a word array,
//! bit 0 being the MSB of word 0 (bit `k` lives in word `k/32`, shift
//! `31 - (k % 32)`).

/// A half-open `[start, start+length)` interval over a bitmap.
///
/// `{0, 0}` is both the canonical no-op range and the sentinel returned by
/// [`alloc_range`] on failure; callers must check `length == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitRange {
	pub start: u32,
	pub length: u32,
}

impl BitRange {
	/// The empty, zero-length range.
	pub const NONE: Self = Self {
		start: 0,
		length: 0,
	};

	/// Whether this range is the failure sentinel.
	pub fn is_empty(&self) -> bool {
		self.length == 0
	}
}

/// Returns whether bit `k` is set in `bm`.
#[inline]
pub fn get_bit(bm: &[u32], k: u32) -> bool {
	let word = (k / 32) as usize;
	let shift = 31 - (k % 32);
	(bm[word] >> shift) & 1 != 0
}

/// Builds the mask covering `n` consecutive bits starting at `bit_in_word`
/// (0 = MSB) within a single word.
fn word_mask(bit_in_word: u32, n: u32) -> u32 {
	if n == 0 {
		return 0;
	}
	if n >= 32 {
		return u32::MAX;
	}
	let top_shift = 31 - bit_in_word;
	let low_shift = top_shift + 1 - n;
	((1u32 << n) - 1) << low_shift
}

/// Sets or clears the half-open range `[start, start+length)`.
///
/// Handles the three cases from §4.1: start and end falling in the same
/// word, a partial start word, a partial end word, and any whole interior
/// words in between. `{start: _, length: 0}` is a no-op.
pub fn apply_range(bm: &mut [u32], start: u32, length: u32, set: bool) {
	if length == 0 {
		return;
	}
	let end = start + length;
	let mut bit = start;
	while bit < end {
		let word_idx = (bit / 32) as usize;
		let bit_in_word = bit % 32;
		let bits_left_in_word = 32 - bit_in_word;
		let n = (end - bit).min(bits_left_in_word);
		let mask = word_mask(bit_in_word, n);
		if set {
			bm[word_idx] |= mask;
		} else {
			bm[word_idx] &= !mask;
		}
		bit += n;
	}
}

/// Clears `range`. Idempotent.
pub fn dealloc_range(bm: &mut [u32], range: BitRange) {
	apply_range(bm, range.start, range.length, false);
}

/// Checks whether every bit in `[start, start+count)` is clear.
fn range_is_free(bm: &[u32], start: u32, count: u32) -> bool {
	(start..start + count).all(|k| !get_bit(bm, k))
}

/// First-fit scan from bit 0 for `count` consecutive free bits, marking
/// them set on success.
///
/// When `word_align` is set, only bit positions that are multiples of 32
/// are tried, guaranteeing every returned `start` satisfies
/// `start % 32 == 0`; the requested `count` is itself rounded up to the
/// next multiple of 32 bits first, so the range's length is word-sized
/// too (required by the byte heap, §4.2). Returns [`BitRange::NONE`] if no
/// run of that many free bits exists below `capacity_bits`.
pub fn alloc_range(bm: &mut [u32], capacity_bits: u32, count: u32, word_align: bool) -> BitRange {
	if count == 0 {
		return BitRange::NONE;
	}
	let count = if word_align {
		count.div_ceil(32) * 32
	} else {
		count
	};
	let step = if word_align { 32 } else { 1 };
	let mut start = 0u32;
	while start + count <= capacity_bits {
		if range_is_free(bm, start, count) {
			#[cfg(config_debug_bitmap_assertions)]
			assert!(
				(start..start + count).all(|k| !get_bit(bm, k)),
				"bitmap: about to hand out a bit that is already set"
			);
			apply_range(bm, start, count, true);
			return BitRange { start, length: count };
		}
		start += step;
	}
	BitRange::NONE
}

#[cfg(test)]
mod tests {
	extern crate std;
	use super::*;

	#[test]
	fn apply_range_same_word() {
		let mut bm = [0u32; 2];
		apply_range(&mut bm, 2, 3, true);
		assert_eq!(bm[0], 0b0011_1000 << 24);
		apply_range(&mut bm, 2, 3, false);
		assert_eq!(bm[0], 0);
	}

	#[test]
	fn apply_range_spans_words() {
		let mut bm = [0u32; 3];
		apply_range(&mut bm, 28, 40, true);
		assert!((28..68).all(|k| get_bit(&bm, k)));
		assert!(!get_bit(&bm, 27));
		assert!(!get_bit(&bm, 68));
	}

	#[test]
	fn apply_range_noop_on_zero_length() {
		let mut bm = [0xdead_beefu32; 2];
		let before = bm;
		apply_range(&mut bm, 5, 0, true);
		assert_eq!(bm, before);
	}

	#[test]
	fn p2_bitmap_range_symmetry() {
		let mut bm = [0x1234_5678u32, 0x9abc_def0];
		let original = bm;
		apply_range(&mut bm, 10, 17, true);
		apply_range(&mut bm, 10, 17, false);
		assert_eq!(bm, original);
	}

	#[test]
	fn p3_allocator_disjointness() {
		let mut bm = [0u32; 4];
		let a = alloc_range(&mut bm, 128, 10, false);
		let b = alloc_range(&mut bm, 128, 20, false);
		let c = alloc_range(&mut bm, 128, 5, false);
		assert!(!a.is_empty() && !b.is_empty() && !c.is_empty());
		let ranges = [a, b, c];
		for i in 0..ranges.len() {
			for j in 0..ranges.len() {
				if i == j {
					continue;
				}
				let (r1, r2) = (ranges[i], ranges[j]);
				let disjoint = r1.start + r1.length <= r2.start || r2.start + r2.length <= r1.start;
				assert!(disjoint, "{r1:?} overlaps {r2:?}");
			}
		}
		for r in ranges {
			assert!((r.start..r.start + r.length).all(|k| get_bit(&bm, k)));
		}
	}

	#[test]
	fn p4_word_aligned_allocation() {
		let mut bm = [0u32; 8];
		alloc_range(&mut bm, 256, 3, false); // occupy bits 0..3 to force alignment skips
		let r = alloc_range(&mut bm, 256, 40, true);
		assert_eq!(r.start % 32, 0);
		assert_eq!(r.length % 32, 0);
		assert_eq!(r.length, 64); // 40 bits rounds up to 64
	}

	/// Scenario 3 from §8: allocate 2, 8, 32; dealloc the middle 8 at bit
	/// 2; allocate 6 — returns `{start: 2, length: 6}`.
	#[test]
	fn scenario_alloc_dealloc_refit() {
		let mut bm = [0u32; 4];
		let a = alloc_range(&mut bm, 128, 2, false);
		let b = alloc_range(&mut bm, 128, 8, false);
		let _c = alloc_range(&mut bm, 128, 32, false);
		assert_eq!(a, BitRange { start: 0, length: 2 });
		assert_eq!(b, BitRange { start: 2, length: 8 });
		dealloc_range(&mut bm, b);
		let d = alloc_range(&mut bm, 128, 6, false);
		assert_eq!(d, BitRange { start: 2, length: 6 });
	}

	#[test]
	fn alloc_range_out_of_space_returns_none() {
		let mut bm = [u32::MAX; 1];
		let r = alloc_range(&mut bm, 32, 1, false);
		assert!(r.is_empty());
	}
}
