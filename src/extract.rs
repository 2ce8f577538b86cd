//! Contains the dominant-color extractor.
//!
//! The image is split into column strips (see [`partition`](crate::partition)),
//! and each strip is tallied into its own private frequency table.
//! Once every strip is done, the tables are merged on a single thread in strip order.
//!
//! Alpha is ignored while counting, so colors that differ only in alpha are merged
//! and every extracted color is fully opaque.
//!
//! Colors with equal counts are ordered by ascending `(red, green, blue)` value.
//! This keeps the result independent of the number of workers and of hash table iteration order.

use crate::{
    partition::{self, strip_offsets},
    Color, Palette, PaletteSize, PixelGrid, Workers,
};
use palette::{cast, Srgba};
#[cfg(feature = "threads")]
use rayon::prelude::*;
use std::{cmp::Reverse, collections::HashMap, ops::Range};

/// A private frequency table keyed by `[red, green, blue]`.
type Tally = HashMap<[u8; 3], u32>;

/// The largest number of entries a strip table is pre-sized for.
const MAX_PRESIZE: usize = 1 << 16;

/// Counts the colors of one column strip, ignoring alpha.
fn tally_strip(pixels: &[Color], width: usize, strip: Range<usize>) -> Tally {
    let height = pixels.len().checked_div(width).unwrap_or(0);
    let mut tally = Tally::with_capacity((strip.len() * height).min(MAX_PRESIZE));

    for row in partition::strip_rows(pixels, width, strip) {
        for &color in row {
            let [r, g, b, _] = cast::into_array(color);
            *tally.entry([r, g, b]).or_insert(0) += 1;
        }
    }

    tally
}

/// The distinct colors of an image and the number of pixels with each color.
///
/// Colors are ordered by descending count,
/// with equal counts ordered by ascending `(red, green, blue)` value.
/// All colors are fully opaque.
///
/// # Examples
/// ```
/// # use color_schemorator::{Bounds, ColorFrequencies, PixelGrid};
/// # use palette::Srgba;
/// # fn main() -> Result<(), color_schemorator::GridError> {
/// let red = Srgba::new(255, 0, 0, 255);
/// let blue = Srgba::new(0, 0, 255, 255);
/// let grid = PixelGrid::from_fn(Bounds::from_size(4, 4), |x, _| if x == 0 { blue } else { red })?;
///
/// let frequencies = ColorFrequencies::new(&grid);
/// assert_eq!(frequencies.colors(), &[red, blue]);
/// assert_eq!(frequencies.counts(), &[12, 4]);
/// assert_eq!(frequencies.total_count(), 16);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorFrequencies {
    /// The distinct colors, most frequent first.
    colors: Vec<Color>,
    /// The number of pixels with each color.
    counts: Vec<u32>,
    /// The total number of pixels counted.
    total_count: u32,
}

impl ColorFrequencies {
    /// Merges strip tables in strip order and sorts the result.
    fn from_tallies(tallies: impl IntoIterator<Item = Tally>) -> Self {
        let mut tallies = tallies.into_iter();
        let mut merged = tallies.next().unwrap_or_default();
        for tally in tallies {
            for (rgb, count) in tally {
                *merged.entry(rgb).or_insert(0) += count;
            }
        }

        let mut entries = merged.into_iter().collect::<Vec<_>>();
        entries.sort_unstable_by_key(|&(rgb, count)| (Reverse(count), rgb));

        let total_count = entries.iter().map(|&(_, count)| count).sum();
        let (colors, counts) = entries
            .into_iter()
            .map(|([r, g, b], count)| (Srgba::new(r, g, b, u8::MAX), count))
            .unzip();

        Self { colors, counts, total_count }
    }

    /// Counts the colors of `grid` on the current thread.
    #[must_use]
    pub fn new(grid: &PixelGrid) -> Self {
        let width = grid.width() as usize;
        Self::from_tallies(
            strip_offsets(width, Workers::ONE)
                .into_iter()
                .map(|strip| tally_strip(grid.pixels(), width, strip)),
        )
    }

    /// Counts the colors of `grid` in parallel, using one private table per column strip.
    ///
    /// The result is identical to [`ColorFrequencies::new`] for any number of workers.
    #[cfg(feature = "threads")]
    #[must_use]
    pub fn new_par(grid: &PixelGrid, workers: Workers) -> Self {
        let width = grid.width() as usize;
        let tallies = strip_offsets(width, workers)
            .into_par_iter()
            .filter(|strip| !strip.is_empty())
            .map(|strip| tally_strip(grid.pixels(), width, strip))
            .collect::<Vec<_>>();

        Self::from_tallies(tallies)
    }

    /// Returns the distinct colors, most frequent first.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Returns the count of each color in the same order as [`ColorFrequencies::colors`].
    #[must_use]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Returns the total number of pixels counted.
    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    /// Returns the number of distinct colors.
    #[must_use]
    pub fn num_colors(&self) -> usize {
        self.colors.len()
    }

    /// Returns the `size` most frequent colors as a [`Palette`].
    ///
    /// The palette has fewer than `size` colors if the image has fewer distinct colors.
    #[must_use]
    pub fn into_palette(self, size: PaletteSize) -> Palette {
        let mut colors = self.colors;
        colors.truncate(usize::from(size.into_inner()));
        Palette::new_unchecked(colors)
    }
}

/// Returns the (at most) `size` most frequent colors of `grid`, computed on the current thread.
///
/// # Examples
/// ```
/// # use color_schemorator::{dominant_palette, Bounds, PaletteSize, PixelGrid};
/// # use palette::Srgba;
/// # fn main() -> Result<(), color_schemorator::GridError> {
/// let grid = PixelGrid::from_fn(Bounds::from_size(8, 8), |_, y| {
///     if y < 6 { Srgba::new(10, 20, 30, 255) } else { Srgba::new(200, 100, 0, 255) }
/// })?;
///
/// let palette = dominant_palette(&grid, PaletteSize::MAX);
/// assert_eq!(palette.to_string(), "#0A141E\n#C86400");
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn dominant_palette(grid: &PixelGrid, size: PaletteSize) -> Palette {
    ColorFrequencies::new(grid).into_palette(size)
}

/// Returns the (at most) `size` most frequent colors of `grid`,
/// counting `workers` column strips in parallel.
#[cfg(feature = "threads")]
#[must_use]
pub fn dominant_palette_par(grid: &PixelGrid, size: PaletteSize, workers: Workers) -> Palette {
    ColorFrequencies::new_par(grid, workers).into_palette(size)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{tests::*, Bounds, MAX_K};
    use std::collections::HashSet;

    fn band_colors() -> Vec<Color> {
        vec![
            Srgba::new(255, 0, 0, 255),
            Srgba::new(0, 255, 0, 255),
            Srgba::new(0, 0, 255, 255),
            Srgba::new(255, 255, 0, 255),
            Srgba::new(20, 20, 20, 255),
        ]
    }

    /// Full-width horizontal bands with the given heights, from top to bottom.
    fn banded_grid(bounds: Bounds, band_heights: &[i32], colors: &[Color]) -> PixelGrid {
        PixelGrid::from_fn(bounds, |_, y| {
            let mut row = y - bounds.min_y;
            for (&height, &color) in band_heights.iter().zip(colors) {
                if row < height {
                    return color;
                }
                row -= height;
            }
            unreachable!()
        })
        .unwrap()
    }

    fn as_set(colors: &[Color]) -> HashSet<[u8; 4]> {
        colors.iter().map(|&c| cast::into_array(c)).collect()
    }

    #[test]
    fn five_equal_bands() {
        let colors = band_colors();
        let grid = banded_grid(Bounds::new(-3, 4, 27, 29), &[5; 5], &colors);

        let palette = dominant_palette(&grid, PaletteSize::MAX);
        assert_eq!(palette.len(), 5);
        assert_eq!(as_set(&palette), as_set(&colors));

        #[cfg(feature = "threads")]
        {
            for n in [1, 2, 3, 4, 7, 30, 31, 64] {
                let par = dominant_palette_par(&grid, PaletteSize::MAX, Workers::new(n).unwrap());
                assert_eq!(par.len(), 5);
                assert_eq!(as_set(&par), as_set(&colors));
            }
        }
    }

    #[test]
    fn bands_ordered_by_frequency() {
        let colors = band_colors();
        let grid = banded_grid(Bounds::from_size(13, 15), &[1, 2, 3, 4, 5], &colors);

        let frequencies = ColorFrequencies::new(&grid);
        let expected = colors.iter().rev().copied().collect::<Vec<_>>();
        assert_eq!(frequencies.colors(), expected);
        assert_eq!(frequencies.counts(), &[65, 52, 39, 26, 13]);
        assert_eq!(frequencies.total_count(), 195);
    }

    #[test]
    fn ties_ordered_by_rgb() {
        let colors = band_colors();
        let grid = banded_grid(Bounds::from_size(6, 10), &[2; 5], &colors);

        let mut expected = colors;
        expected.sort_by_key(|&c| cast::into_array(c));
        assert_eq!(ColorFrequencies::new(&grid).colors(), expected);
    }

    #[test]
    fn alpha_is_ignored() {
        let grid = PixelGrid::from_fn(Bounds::from_size(8, 8), |x, y| {
            let alpha = u8::try_from(x * 8 + y).unwrap();
            if x < 2 {
                Srgba::new(1, 2, 3, alpha)
            } else {
                Srgba::new(9, 9, 9, alpha)
            }
        })
        .unwrap();

        let frequencies = ColorFrequencies::new(&grid);
        assert_eq!(
            frequencies.colors(),
            &[Srgba::new(9, 9, 9, 255), Srgba::new(1, 2, 3, 255)]
        );
        assert_eq!(frequencies.counts(), &[48, 16]);
    }

    #[test]
    fn truncates_to_palette_size() {
        let grid = test_grid_1024();
        let frequencies = ColorFrequencies::new(&grid);
        assert_eq!(frequencies.num_colors(), 1024);
        assert!(frequencies.counts().iter().all(|&count| count == 1));

        let palette = frequencies.clone().into_palette(PaletteSize::MAX);
        assert_eq!(palette.len(), MAX_K);
        assert_eq!(palette.colors(), &frequencies.colors()[..MAX_K]);

        let small = frequencies.into_palette(PaletteSize::from_clamped(3));
        assert_eq!(small.len(), 3);
    }

    #[test]
    fn counts_sum_to_pixel_count() {
        let grid = test_grid_1024();
        let frequencies = ColorFrequencies::new(&grid);
        assert_eq!(frequencies.total_count(), grid.num_pixels());
        assert_eq!(frequencies.counts().iter().sum::<u32>(), grid.num_pixels());
    }

    #[test]
    fn single_color_image() {
        let color = Srgba::new(4, 5, 6, 255);
        let grid = PixelGrid::filled(Bounds::from_size(9, 9), color).unwrap();
        let palette = dominant_palette(&grid, PaletteSize::MAX);
        assert_eq!(palette.colors(), &[color]);
    }

    #[test]
    fn empty_grid() {
        let grid = PixelGrid::new(Bounds::new(2, 2, 2, 8), Vec::new()).unwrap();
        let frequencies = ColorFrequencies::new(&grid);
        assert_eq!(frequencies, ColorFrequencies::default());
        assert!(dominant_palette(&grid, PaletteSize::MAX).is_empty());

        #[cfg(feature = "threads")]
        {
            assert_eq!(
                ColorFrequencies::new_par(&grid, Workers::new(4).unwrap()),
                ColorFrequencies::default()
            );
        }
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let mut pixels = test_data_256();
        pixels.extend_from_within(..);
        pixels.extend_from_within(..100);
        pixels.truncate(600);
        let grid = PixelGrid::new(Bounds::new(0, -10, 30, 10), pixels).unwrap();

        let single = ColorFrequencies::new(&grid);
        for n in [1, 2, 3, 5, 8, 29, 30, 31, 64] {
            assert_eq!(ColorFrequencies::new_par(&grid, Workers::new(n).unwrap()), single);
        }
    }
}
