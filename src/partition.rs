//! Splits a pixel rectangle into disjoint column strips, one per worker.
//!
//! Every strip except the last is `width / workers` columns wide,
//! and the last strip also takes the remaining columns.
//! When the image is narrower than the number of workers,
//! all strips but the last are empty and produce no work.

use crate::{Bounds, Workers};
use std::{mem, ops::Range};

/// Returns the column ranges of each strip relative to the left edge of an image `width` pixels wide.
///
/// The ranges are contiguous, start at `0`, and end at `width`.
#[must_use]
pub fn strip_offsets(width: usize, workers: Workers) -> Vec<Range<usize>> {
    let n = workers.get();
    let strip_width = width / n;
    (0..n)
        .map(|i| {
            let start = i * strip_width;
            let end = if i == n - 1 { width } else { start + strip_width };
            start..end
        })
        .collect()
}

/// Returns the absolute column range `[start_x, end_x)` of each strip of `bounds`.
///
/// # Examples
/// ```
/// # use color_schemorator::{partition::column_strips, Bounds, Workers};
/// let strips = column_strips(Bounds::from_size(10, 4), Workers::new(3).unwrap());
/// assert_eq!(strips, vec![0..3, 3..6, 6..10]);
/// ```
#[must_use]
pub fn column_strips(bounds: Bounds, workers: Workers) -> Vec<Range<i32>> {
    let min_x = i64::from(bounds.min_x);
    strip_offsets(bounds.width() as usize, workers)
        .into_iter()
        .map(|Range { start, end }| {
            // offsets never exceed the width, so the sums stay within min_x..=max_x
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let range = (min_x + start as i64) as i32..(min_x + end as i64) as i32;
            range
        })
        .collect()
}

/// Returns the part of each row of a row-major buffer that lies within `strip`.
pub(crate) fn strip_rows<'a, T>(
    buf: &'a [T],
    width: usize,
    strip: Range<usize>,
) -> impl Iterator<Item = &'a [T]> + 'a {
    buf.chunks_exact(width.max(1))
        .map(move |row| &row[strip.clone()])
}

/// Splits a row-major buffer into per-strip lists of mutable row segments.
///
/// The `i`-th returned list holds, from top to bottom, the part of each row covered by `strips[i]`.
/// The strips must be contiguous and start at column `0`, as returned by [`strip_offsets`].
/// Since the segments are disjoint, each list can be handed to a different thread.
pub(crate) fn split_strips_mut<'a, T>(
    buf: &'a mut [T],
    width: usize,
    strips: &[Range<usize>],
) -> Vec<Vec<&'a mut [T]>> {
    let height = buf.len().checked_div(width).unwrap_or(0);
    let mut segments = strips
        .iter()
        .map(|_| Vec::with_capacity(height))
        .collect::<Vec<_>>();

    if width > 0 {
        for row in buf.chunks_exact_mut(width) {
            let mut rest = row;
            for (segment_list, strip) in segments.iter_mut().zip(strips) {
                let (segment, tail) = mem::take(&mut rest).split_at_mut(strip.len());
                segment_list.push(segment);
                rest = tail;
            }
        }
    }

    segments
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn workers(n: usize) -> Workers {
        Workers::new(n).unwrap()
    }

    fn assert_exact_cover(strips: &[Range<i32>], bounds: Bounds) {
        assert_eq!(strips.first().unwrap().start, bounds.min_x);
        assert_eq!(strips.last().unwrap().end, bounds.min_x + bounds.width() as i32);
        for pair in strips.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for strip in strips {
            assert!(strip.start <= strip.end);
        }
    }

    #[test]
    fn width_ten_three_workers() {
        let bounds = Bounds::from_size(10, 7);
        let strips = column_strips(bounds, workers(3));
        assert_eq!(strips, vec![0..3, 3..6, 6..10]);
        assert_exact_cover(&strips, bounds);
    }

    #[test]
    fn strips_follow_grid_origin() {
        let bounds = Bounds::new(-5, 2, 6, 9);
        let strips = column_strips(bounds, workers(4));
        assert_eq!(strips, vec![-5..-3, -3..-1, -1..1, 1..6]);
    }

    #[test]
    fn narrow_image_leaves_strips_empty() {
        let bounds = Bounds::from_size(2, 3);
        let strips = column_strips(bounds, workers(5));
        assert_eq!(strips, vec![0..0, 0..0, 0..0, 0..0, 0..2]);
        assert_exact_cover(&strips, bounds);
    }

    #[test]
    fn zero_width_gives_only_empty_strips() {
        let bounds = Bounds::new(4, 0, 1, 10);
        let strips = column_strips(bounds, workers(3));
        assert_eq!(strips.len(), 3);
        assert!(strips.iter().all(|s| s.is_empty() && s.start == 4));
    }

    #[test]
    fn every_combination_covers_exactly() {
        for width in 0..40 {
            for n in 1..=16 {
                let bounds = Bounds::new(3, 0, 3 + width, 1);
                let strips = column_strips(bounds, workers(n));
                assert_eq!(strips.len(), n);
                assert_exact_cover(&strips, bounds);

                let strip_width = width / n as i32;
                for strip in &strips[..(n - 1)] {
                    assert_eq!(strip.end - strip.start, strip_width);
                }
            }
        }
    }

    #[test]
    fn split_segments_are_disjoint_and_complete() {
        let width = 10;
        let height = 4;
        let strips = strip_offsets(width, workers(3));
        let mut buf = vec![usize::MAX; width * height];

        for (i, segments) in split_strips_mut(&mut buf, width, &strips)
            .into_iter()
            .enumerate()
        {
            assert_eq!(segments.len(), height);
            for segment in segments {
                assert_eq!(segment.len(), strips[i].len());
                for value in segment {
                    assert_eq!(*value, usize::MAX);
                    *value = i;
                }
            }
        }

        let expected_row = [0, 0, 0, 1, 1, 1, 2, 2, 2, 2];
        for row in buf.chunks_exact(width) {
            assert_eq!(row, expected_row);
        }
    }

    #[test]
    fn strip_rows_reads_matching_columns() {
        let width = 5;
        let buf = (0..15).collect::<Vec<i32>>();
        let rows = strip_rows(&buf, width, 1..3).collect::<Vec<_>>();
        let expected: Vec<&[i32]> = vec![&[1, 2], &[6, 7], &[11, 12]];
        assert_eq!(rows, expected);
    }

    #[test]
    fn split_empty_buffer() {
        let strips = strip_offsets(0, workers(4));
        let mut buf: Vec<u8> = Vec::new();
        let segments = split_strips_mut(&mut buf, 0, &strips);
        assert_eq!(segments.len(), 4);
        assert!(segments.iter().all(Vec::is_empty));
    }
}
