//! Contains the nearest-color remapper.
//!
//! Each pixel is replaced by the palette color with the smallest squared euclidean distance
//! over the four 8-bit channels. If several palette colors are equally close,
//! the one that comes first in the palette is chosen, so the output is fully deterministic.
//!
//! The parallel version splits the image into column strips (see [`partition`](crate::partition)).
//! Each strip is written into its own disjoint part of the output grid,
//! so the result is the same for every number of workers.

use crate::{
    partition::{self, split_strips_mut, strip_offsets},
    Color, PixelGrid, RemapError, Workers,
};
use palette::cast;
#[cfg(feature = "threads")]
use rayon::prelude::*;
use std::ops::Range;

/// Squared euclidean distance between two colors over all four channels.
#[inline]
fn squared_distance(x: Color, y: Color) -> u32 {
    cast::into_array(x)
        .into_iter()
        .zip(cast::into_array(y))
        .map(|(a, b)| {
            let d = u32::from(a.abs_diff(b));
            d * d
        })
        .sum()
}

/// Returns the index of the palette color nearest to `color`.
///
/// Ties are resolved in favor of the earliest palette color.
/// Returns `None` if `palette` is empty.
///
/// # Examples
/// ```
/// # use color_schemorator::remap::nearest_index;
/// # use palette::Srgba;
/// let palette = [Srgba::new(0, 0, 0, 255), Srgba::new(255, 255, 255, 255)];
/// assert_eq!(nearest_index(&palette, Srgba::new(20, 30, 10, 255)), Some(0));
/// assert_eq!(nearest_index(&palette, Srgba::new(200, 130, 210, 255)), Some(1));
/// assert_eq!(nearest_index(&[], Srgba::new(0, 0, 0, 255)), None);
/// ```
#[must_use]
pub fn nearest_index(palette: &[Color], color: Color) -> Option<usize> {
    let (first, rest) = palette.split_first()?;

    let mut min_index = 0;
    let mut min_distance = squared_distance(*first, color);
    for (i, &candidate) in rest.iter().enumerate() {
        if min_distance == 0 {
            break;
        }
        let distance = squared_distance(candidate, color);
        if distance < min_distance {
            min_distance = distance;
            min_index = i + 1;
        }
    }

    Some(min_index)
}

/// Returns the palette color nearest to `color`, or `None` if `palette` is empty.
#[must_use]
pub fn nearest_color(palette: &[Color], color: Color) -> Option<Color> {
    nearest_index(palette, color).map(|i| palette[i])
}

/// The work assigned to one column strip.
struct StripJob<'a> {
    /// The source pixels in row-major order.
    source: &'a [Color],
    /// The width of the source grid.
    width: usize,
    /// The columns covered by this strip.
    strip: Range<usize>,
    /// The output row segments for this strip, from top to bottom.
    output: Vec<&'a mut [Color]>,
    /// The non-empty palette to remap onto.
    palette: &'a [Color],
}

impl StripJob<'_> {
    /// Remaps every pixel of the strip into its output segments.
    fn run(self) {
        let Self { source, width, strip, output, palette } = self;

        // neighboring pixels often share a color, so remember the last lookup
        let mut last: Option<(Color, Color)> = None;

        for (src_row, dst_row) in partition::strip_rows(source, width, strip).zip(output) {
            for (dst, &src) in dst_row.iter_mut().zip(src_row) {
                *dst = match last {
                    Some((prev, nearest)) if prev == src => nearest,
                    _ => {
                        let nearest = palette[nearest_index(palette, src).unwrap_or(0)];
                        last = Some((src, nearest));
                        nearest
                    }
                };
            }
        }
    }
}

/// Allocates the output grid, splits it into strips, and hands the strip jobs to `run`.
fn remap_strips(
    grid: &PixelGrid,
    palette: &[Color],
    workers: Workers,
    run: impl FnOnce(Vec<StripJob<'_>>),
) -> Result<PixelGrid, RemapError> {
    let Some(&fill) = palette.first() else {
        return Err(RemapError::EmptyPalette);
    };

    let bounds = grid.bounds();
    if grid.is_empty() {
        return Ok(PixelGrid::new_unchecked(bounds, Vec::new()));
    }

    let width = grid.width() as usize;
    let strips = strip_offsets(width, workers);
    let mut output = vec![fill; grid.pixels().len()];

    let jobs = split_strips_mut(&mut output, width, &strips)
        .into_iter()
        .zip(strips.iter().cloned())
        .filter(|(_, strip)| !strip.is_empty())
        .map(|(segments, strip)| StripJob {
            source: grid.pixels(),
            width,
            strip,
            output: segments,
            palette,
        })
        .collect::<Vec<_>>();

    run(jobs);

    Ok(PixelGrid::new_unchecked(bounds, output))
}

/// Creates a new grid with the same bounds as `grid`,
/// where each pixel is replaced by its nearest color in `palette`.
///
/// # Errors
/// Returns [`RemapError::EmptyPalette`] if `palette` has no colors.
/// A grid with no pixels is not an error and results in another empty grid.
///
/// # Examples
/// ```
/// # use color_schemorator::{remap::remap, Bounds, Palette, PixelGrid};
/// # use palette::Srgba;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let palette: Palette = "#f00\n#00f".parse()?;
/// let grid = PixelGrid::filled(Bounds::from_size(3, 2), Srgba::new(200, 10, 90, 255))?;
///
/// let remapped = remap(&grid, &palette)?;
/// assert_eq!(remapped.bounds(), grid.bounds());
/// assert!(remapped.pixels().iter().all(|&c| c == palette[0]));
/// # Ok(())
/// # }
/// ```
pub fn remap(grid: &PixelGrid, palette: &[Color]) -> Result<PixelGrid, RemapError> {
    remap_strips(grid, palette, Workers::ONE, |jobs| {
        jobs.into_iter().for_each(StripJob::run);
    })
}

/// Creates a new grid in parallel, where each pixel of `grid` is replaced by its nearest color in `palette`.
///
/// The image is split into `workers` column strips that are remapped concurrently,
/// and this function returns once every strip is done.
/// The result is identical to [`remap`] for any number of workers.
///
/// # Errors
/// Returns [`RemapError::EmptyPalette`] if `palette` has no colors.
#[cfg(feature = "threads")]
pub fn remap_par(
    grid: &PixelGrid,
    palette: &[Color],
    workers: Workers,
) -> Result<PixelGrid, RemapError> {
    remap_strips(grid, palette, workers, |jobs| {
        jobs.into_par_iter().for_each(StripJob::run);
    })
}
