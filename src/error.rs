//! Error types returned across the crate.

use crate::Color;
use std::{
    error::Error,
    fmt::{self, Debug, Display},
};
use thiserror::Error;

/// An error type for when the length of an input (e.g., `Vec` or slice)
/// is above the maximum supported value.
///
/// The inner value is the maximum supported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AboveMaxLen<T>(pub T);

impl<T: Display> Display for AboveMaxLen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "above the maximum length of {}", self.0)
    }
}

impl<T: Debug + Display> Error for AboveMaxLen<T> {}

/// An error returned when constructing a [`PixelGrid`](crate::PixelGrid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    /// The pixel buffer does not have exactly `width * height` pixels.
    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        /// The length of the provided pixel buffer.
        len: usize,
        /// The width of the requested bounds.
        width: u32,
        /// The height of the requested bounds.
        height: u32,
    },
    /// A dimension does not fit in an `i32` coordinate.
    #[error("image dimensions {width}x{height} do not fit in i32 coordinates")]
    DimensionOutOfRange {
        /// The width of the image.
        width: u32,
        /// The height of the image.
        height: u32,
    },
    /// The grid has more than [`MAX_PIXELS`](crate::MAX_PIXELS) pixels.
    #[error("number of pixels is {0}")]
    TooManyPixels(#[from] AboveMaxLen<u32>),
}

/// An error returned by the nearest-color remapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RemapError {
    /// The palette has no colors, so no nearest color exists.
    #[error("cannot remap onto an empty palette")]
    EmptyPalette,
}

/// An error returned when building a [`Palette`](crate::Palette) from a list of colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaletteError {
    /// Fewer colors than [`MIN_COLORS`](crate::MIN_COLORS) were given.
    #[error("palette has {found} colors but needs at least {min}")]
    TooFewColors {
        /// The minimum number of colors.
        min: u16,
        /// The number of colors given.
        found: usize,
    },
    /// More colors than [`MAX_COLORS`](crate::MAX_COLORS) were given.
    #[error("palette has {found} colors but may have at most {max}")]
    TooManyColors {
        /// The maximum number of colors.
        max: u16,
        /// The number of colors given.
        found: usize,
    },
    /// The color at `index` is equal to an earlier color.
    #[error("duplicate color found at index {index}")]
    DuplicateColor {
        /// The index of the second occurrence.
        index: usize,
    },
}

/// The reason a single token is not a valid hex color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HexColorError {
    /// The token is not 4 (`#RGB`) or 7 (`#RRGGBB`) characters long.
    #[error("expected 4 or 7 characters, found {0}")]
    InvalidLength(usize),
    /// The token does not start with `#`.
    #[error("missing leading '#'")]
    MissingHash,
    /// The token contains a character that is not a hexadecimal digit.
    #[error("'{0}' is not a hexadecimal digit")]
    InvalidDigit(char),
}

/// A single validation failure found while parsing a palette.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteProblem {
    /// The palette has fewer than [`MIN_COLORS`](crate::MIN_COLORS) distinct colors.
    #[error("Minimum amount of colors in palette is {min}")]
    TooFewColors {
        /// The minimum number of colors.
        min: u16,
    },
    /// The source has more than [`MAX_COLORS`](crate::MAX_COLORS) distinct colors.
    #[error("Max amount of colors in palette is {max}")]
    TooManyColors {
        /// The maximum number of colors.
        max: u16,
    },
    /// A line could not be parsed as a hex color.
    #[error("Error on line {line}: invalid hex color '{token}' ({reason})")]
    InvalidLine {
        /// The 1-based line number in the palette text.
        line: usize,
        /// The offending token, truncated for display.
        token: String,
        /// Why the token was rejected.
        reason: HexColorError,
    },
}

/// The aggregated error returned when a palette text fails validation.
///
/// It lists every problem found in one pass rather than only the first one.
/// Its [`Display`] output is a multi-line report: a count-limit message (if any) first,
/// then each invalid line in order, then a summary of invalid lines that were not listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePaletteError {
    /// The recorded problems in report order.
    pub(crate) problems: Vec<PaletteProblem>,
    /// The number of invalid lines found after the report cap was reached.
    pub(crate) unreported: usize,
    /// The colors collected before parsing stopped.
    pub(crate) partial: Vec<Color>,
}

impl ParsePaletteError {
    /// Returns the recorded problems in report order.
    #[must_use]
    pub fn problems(&self) -> &[PaletteProblem] {
        &self.problems
    }

    /// Returns the number of invalid lines that were not listed individually.
    #[must_use]
    pub fn unreported(&self) -> usize {
        self.unreported
    }

    /// Returns the distinct colors collected before parsing stopped.
    #[must_use]
    pub fn partial_colors(&self) -> &[Color] {
        &self.partial
    }
}

impl Display for ParsePaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self.problems.iter();
        if let Some(first) = lines.next() {
            write!(f, "{first}")?;
            for problem in lines {
                write!(f, "\n{problem}")?;
            }
            if self.unreported > 0 {
                write!(f, "\n{} more errors...", self.unreported)?;
            }
        } else if self.unreported > 0 {
            write!(f, "{} more errors...", self.unreported)?;
        }
        Ok(())
    }
}

impl Error for ParsePaletteError {}
