//! Search and sort primitives over `u16` key buffers.
//!
//! A key buffer of length `size` has a prefix `[0, sorted)` that is strictly
//! ascending and a suffix `[sorted, size)` in insertion order. Keys are unique
//! across the whole buffer; the sort routines rely on this.
//!
//! Lookups binary-search the prefix and scan the suffix. Suffix scans shorter
//! than [`SMALL_SCAN`] run as a plain loop; longer ones compare 8 lanes at a
//! time with SSE2 (16 with AVX2 when the CPU has it) and take the lowest set
//! bit of the match mask. The vector paths return exactly what
//! [`linear_find`] returns.

use std::collections::TryReserveError;

/// Below this many keys a suffix scan is a plain loop.
pub const SMALL_SCAN: usize = 64;

/// Ranges at most this long are insertion sorted.
const INSERTION_SORT_MAX: usize = 16;

/// Finds `value` in `keys`, whose first `sorted` keys are strictly ascending.
#[inline]
pub fn find(keys: &[u16], sorted: usize, value: u16) -> Option<usize> {
    debug_assert!(sorted <= keys.len());
    if sorted > 0 {
        if let Ok(i) = keys[..sorted].binary_search(&value) {
            return Some(i);
        }
    }
    scan_unsorted(&keys[sorted..], value).map(|i| i + sorted)
}

/// Reference scan: index of the first key equal to `value`.
#[inline]
pub fn linear_find(keys: &[u16], value: u16) -> Option<usize> {
    keys.iter().position(|&k| k == value)
}

/// Scans an unordered run of keys.
#[inline]
pub fn scan_unsorted(keys: &[u16], value: u16) -> Option<usize> {
    if keys.len() < SMALL_SCAN {
        return linear_find(keys, value);
    }
    scan_wide(keys, value)
}

/// Portable 8-lane scan: builds a match mask per chunk, like the vector paths.
pub fn scan_lanes(keys: &[u16], value: u16) -> Option<usize> {
    let chunks = keys.chunks_exact(8);
    let rem = chunks.remainder();
    for (i, chunk) in chunks.enumerate() {
        let mut mask = 0u32;
        for (lane, &k) in chunk.iter().enumerate() {
            mask |= u32::from(k == value) << lane;
        }
        if mask != 0 {
            return Some(i * 8 + mask.trailing_zeros() as usize);
        }
    }
    let base = keys.len() - rem.len();
    linear_find(rem, value).map(|i| base + i)
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
#[inline]
fn scan_wide(keys: &[u16], value: u16) -> Option<usize> {
    if std::is_x86_feature_detected!("avx2") {
        // SAFETY: feature detected at runtime.
        return unsafe { scan_avx2(keys, value) };
    }
    scan_sse2(keys, value)
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
#[inline]
fn scan_wide(keys: &[u16], value: u16) -> Option<usize> {
    scan_lanes(keys, value)
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
fn scan_sse2(keys: &[u16], value: u16) -> Option<usize> {
    use std::arch::x86_64::*;

    let chunks = keys.chunks_exact(8);
    let rem = chunks.remainder();
    // SAFETY: SSE2 is enabled at compile time. Each load reads exactly the
    // 16 bytes of one 8-key chunk, unaligned.
    unsafe {
        let needle = _mm_set1_epi16(value as i16);
        for (i, chunk) in chunks.enumerate() {
            let lanes = _mm_loadu_si128(chunk.as_ptr() as *const __m128i);
            // Two mask bits per 16-bit lane.
            let mask = _mm_movemask_epi8(_mm_cmpeq_epi16(lanes, needle)) as u32;
            if mask != 0 {
                return Some(i * 8 + (mask.trailing_zeros() as usize) / 2);
            }
        }
    }
    let base = keys.len() - rem.len();
    linear_find(rem, value).map(|i| base + i)
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
#[target_feature(enable = "avx2")]
unsafe fn scan_avx2(keys: &[u16], value: u16) -> Option<usize> {
    use std::arch::x86_64::*;

    let chunks = keys.chunks_exact(16);
    let rem = chunks.remainder();
    // SAFETY: caller guarantees AVX2. Each load reads the 32 bytes of one
    // 16-key chunk, unaligned.
    unsafe {
        let needle = _mm256_set1_epi16(value as i16);
        for (i, chunk) in chunks.enumerate() {
            let lanes = _mm256_loadu_si256(chunk.as_ptr() as *const __m256i);
            let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi16(lanes, needle)) as u32;
            if mask != 0 {
                return Some(i * 16 + (mask.trailing_zeros() as usize) / 2);
            }
        }
    }
    let base = keys.len() - rem.len();
    scan_sse2(rem, value).map(|i| base + i)
}

/// Sorts `keys` ascending, applying the same permutation to `values`.
///
/// Keys must be pairwise distinct. Uses median-of-three quicksort, recursing
/// into the smaller side and finishing short ranges with insertion sort.
pub fn quicksort<T>(keys: &mut [u16], values: &mut [T]) {
    debug_assert_eq!(keys.len(), values.len());
    let (mut keys, mut values) = (keys, values);
    loop {
        let n = keys.len();
        if n <= INSERTION_SORT_MAX {
            insertion_sort(keys, values);
            return;
        }
        let p = partition(keys, values);
        let (kl, kr) = std::mem::take(&mut keys).split_at_mut(p);
        let (vl, vr) = std::mem::take(&mut values).split_at_mut(p);
        // kr[0] is the pivot, already in its final place.
        let (kr, vr) = (&mut kr[1..], &mut vr[1..]);
        if kl.len() < kr.len() {
            quicksort(kl, vl);
            keys = kr;
            values = vr;
        } else {
            quicksort(kr, vr);
            keys = kl;
            values = vl;
        }
    }
}

/// Sorts keys alone.
pub fn sort_keys(keys: &mut [u16]) {
    let mut unit = vec![(); keys.len()];
    quicksort(keys, &mut unit);
}

fn insertion_sort<T>(keys: &mut [u16], values: &mut [T]) {
    for i in 1..keys.len() {
        let mut j = i;
        while j > 0 && keys[j - 1] > keys[j] {
            keys.swap(j - 1, j);
            values.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Lomuto partition around the median of the first, middle and last keys.
/// Returns the pivot's final index.
fn partition<T>(keys: &mut [u16], values: &mut [T]) -> usize {
    let last = keys.len() - 1;
    let mid = last / 2;
    if keys[mid] < keys[0] {
        keys.swap(mid, 0);
        values.swap(mid, 0);
    }
    if keys[last] < keys[0] {
        keys.swap(last, 0);
        values.swap(last, 0);
    }
    if keys[last] < keys[mid] {
        keys.swap(last, mid);
        values.swap(last, mid);
    }
    // Median now at `mid`; park it at the end.
    keys.swap(mid, last);
    values.swap(mid, last);

    let pivot = keys[last];
    let mut store = 0;
    for i in 0..last {
        debug_assert_ne!(keys[i], pivot, "duplicate key {pivot} in sort range");
        if keys[i] < pivot {
            keys.swap(i, store);
            values.swap(i, store);
            store += 1;
        }
    }
    keys.swap(store, last);
    values.swap(store, last);
    store
}

/// Stable merge of the sorted runs `[0, mid)` and `[mid, len)` into the
/// (empty) output buffers, which must already have room for every entry.
pub fn merge<T>(
    keys: &[u16],
    mut values: Vec<T>,
    mid: usize,
    out_keys: &mut Vec<u16>,
    out_values: &mut Vec<T>,
) {
    debug_assert_eq!(keys.len(), values.len());
    debug_assert!(mid <= keys.len());

    let right_values = values.split_off(mid);
    let mut left = keys[..mid].iter().copied().zip(values).peekable();
    let mut right = keys[mid..].iter().copied().zip(right_values).peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some((l, _)), Some((r, _))) => l <= r,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        if let Some((k, v)) = next {
            out_keys.push(k);
            out_values.push(v);
        }
    }
}

/// Moves a full key/value buffer into buffers of `new_capacity`.
///
/// When the old capacity (`keys.len()`) is below `threshold` this is a plain
/// move and the sorted watermark stays `sorted`. Otherwise the buffer comes out
/// fully sorted: an unsorted buffer (`sorted == 0`) is quicksorted whole, while
/// a buffer with a sorted prefix has its tail quicksorted and merged with the
/// prefix. Returns the new buffers and watermark.
///
/// The new buffers are reserved before anything is touched, so on allocation
/// failure the inputs are handed back unchanged.
#[allow(clippy::type_complexity)]
pub fn regrow<T>(
    mut keys: Vec<u16>,
    mut values: Vec<T>,
    sorted: usize,
    new_capacity: usize,
    threshold: usize,
) -> Result<(Vec<u16>, Vec<T>, usize), (Vec<u16>, Vec<T>, TryReserveError)> {
    debug_assert_eq!(keys.len(), values.len());
    debug_assert!(new_capacity >= keys.len());

    let mut new_keys = Vec::new();
    if let Err(e) = new_keys.try_reserve_exact(new_capacity) {
        return Err((keys, values, e));
    }
    let mut new_values = Vec::new();
    if let Err(e) = new_values.try_reserve_exact(new_capacity) {
        return Err((keys, values, e));
    }

    let old_capacity = keys.len();
    if old_capacity < threshold {
        new_keys.append(&mut keys);
        new_values.append(&mut values);
        return Ok((new_keys, new_values, sorted));
    }

    if sorted == 0 {
        quicksort(&mut keys, &mut values);
        new_keys.append(&mut keys);
        new_values.append(&mut values);
    } else {
        quicksort(&mut keys[sorted..], &mut values[sorted..]);
        merge(&keys, values, sorted, &mut new_keys, &mut new_values);
    }
    Ok((new_keys, new_values, old_capacity))
}
