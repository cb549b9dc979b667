//! Splitting ordered sequences into contiguous parts.
//!
//! Long lists of translated strings are checked in parts, scrolling
//! between parts so content below the fold becomes visible.

use std::num::NonZeroUsize;

/// Split `items` into exactly `parts` contiguous slices of `ceil(len / parts)`.
///
/// Slices are not rebalanced, so trailing slices may be short or empty.
/// Concatenating the result always yields `items`.
///
/// ```
/// use std::num::NonZeroUsize;
/// use polyprobe::split_into_parts;
///
/// let items: Vec<u32> = (0..10).collect();
/// let parts = split_into_parts(&items, NonZeroUsize::new(3).unwrap());
/// let lens: Vec<_> = parts.iter().map(|p| p.len()).collect();
/// assert_eq!(lens, [4, 4, 2]);
/// ```
#[must_use]
pub fn split_into_parts<T>(items: &[T], parts: NonZeroUsize) -> Vec<&[T]> {
    let parts = parts.get();
    let chunk = items.len().div_ceil(parts);

    (0..parts)
        .map(|i| {
            let start = (i * chunk).min(items.len());
            let end = (start + chunk).min(items.len());
            &items[start..end]
        })
        .collect()
}

/// Default number of parts for scroll-based visibility checks
pub const SCROLL_PARTS: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(n) => n,
    None => unreachable!(),
};
