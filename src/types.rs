//! Contains various types needed across the crate.

use crate::{AboveMaxLen, GridError, MAX_COLORS, MAX_PIXELS};
use palette::Srgba;
use std::{
    fmt::{self, Display},
    num::NonZeroUsize,
    slice::ChunksExact,
    thread,
};
#[cfg(feature = "image")]
use {
    image::RgbaImage,
    palette::cast::{ComponentsAs, IntoComponents},
};

/// An 8-bit per channel RGBA color.
///
/// Colors produced by palette parsing or extraction are always fully opaque.
pub type Color = Srgba<u8>;

/// The pixel rectangle of a [`PixelGrid`].
///
/// The minimum coordinates are inclusive and the maximum coordinates are exclusive,
/// so the width is `max_x - min_x` and the height is `max_y - min_y`.
/// A rectangle whose maximum is below its minimum has a width or height of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bounds {
    /// The leftmost column.
    pub min_x: i32,
    /// The topmost row.
    pub min_y: i32,
    /// One past the rightmost column.
    pub max_x: i32,
    /// One past the bottom row.
    pub max_y: i32,
}

impl Bounds {
    /// Creates a new [`Bounds`] from its corner coordinates.
    #[must_use]
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Creates a new [`Bounds`] with its origin at `(0, 0)`.
    ///
    /// Dimensions above `i32::MAX` are clamped.
    #[must_use]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(
            0,
            0,
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    /// The number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        if self.max_x > self.min_x {
            self.max_x.abs_diff(self.min_x)
        } else {
            0
        }
    }

    /// The number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        if self.max_y > self.min_y {
            self.max_y.abs_diff(self.min_y)
        } else {
            0
        }
    }

    /// Whether the rectangle covers no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// The number of pixels covered by the rectangle.
    #[must_use]
    pub const fn num_pixels(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Whether the pixel at `(x, y)` lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        self.min_x <= x && x < self.max_x && self.min_y <= y && y < self.max_y
    }
}

impl Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// A rectangular, row-major grid of pixels.
///
/// The invariants are that the number of pixels is equal to `width * height`
/// of the grid's [`Bounds`] and is not greater than [`MAX_PIXELS`].
///
/// # Examples
/// ```
/// # use color_schemorator::{Bounds, PixelGrid};
/// # use palette::Srgba;
/// # fn main() -> Result<(), color_schemorator::GridError> {
/// let black = Srgba::new(0, 0, 0, 255);
/// let grid = PixelGrid::filled(Bounds::new(10, 10, 20, 15), black)?;
/// assert_eq!(grid.width(), 10);
/// assert_eq!(grid.get(12, 11), Some(black));
/// assert_eq!(grid.get(0, 0), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    /// The pixel rectangle.
    bounds: Bounds,
    /// The pixels in row-major order.
    pixels: Vec<Color>,
}

impl PixelGrid {
    /// Checks that `bounds` is not above [`MAX_PIXELS`] and returns its pixel count.
    fn checked_len(bounds: Bounds) -> Result<usize, GridError> {
        let len = bounds.num_pixels();
        if len <= u64::from(MAX_PIXELS) {
            usize::try_from(len).map_err(|_| AboveMaxLen(MAX_PIXELS).into())
        } else {
            Err(AboveMaxLen(MAX_PIXELS).into())
        }
    }

    /// Creates a [`PixelGrid`] without validating the length of `pixels`.
    pub(crate) fn new_unchecked(bounds: Bounds, pixels: Vec<Color>) -> Self {
        debug_assert_eq!(bounds.num_pixels(), pixels.len() as u64);
        Self { bounds, pixels }
    }

    /// Creates a new [`PixelGrid`] from row-major `pixels`.
    ///
    /// # Errors
    /// Returns an error if the grid would be larger than [`MAX_PIXELS`]
    /// or if the length of `pixels` is not `width * height`.
    pub fn new(bounds: Bounds, pixels: Vec<Color>) -> Result<Self, GridError> {
        let len = Self::checked_len(bounds)?;
        if pixels.len() == len {
            Ok(Self { bounds, pixels })
        } else {
            Err(GridError::DimensionMismatch {
                len: pixels.len(),
                width: bounds.width(),
                height: bounds.height(),
            })
        }
    }

    /// Creates a new [`PixelGrid`] where every pixel is `color`.
    ///
    /// # Errors
    /// Returns an error if the grid would be larger than [`MAX_PIXELS`].
    pub fn filled(bounds: Bounds, color: Color) -> Result<Self, GridError> {
        let len = Self::checked_len(bounds)?;
        Ok(Self { bounds, pixels: vec![color; len] })
    }

    /// Creates a new [`PixelGrid`] by calling `pixel(x, y)` for each coordinate in row-major order.
    ///
    /// # Errors
    /// Returns an error if the grid would be larger than [`MAX_PIXELS`].
    pub fn from_fn(
        bounds: Bounds,
        mut pixel: impl FnMut(i32, i32) -> Color,
    ) -> Result<Self, GridError> {
        let len = Self::checked_len(bounds)?;
        let mut pixels = Vec::with_capacity(len);
        if len > 0 {
            for y in bounds.min_y..bounds.max_y {
                for x in bounds.min_x..bounds.max_x {
                    pixels.push(pixel(x, y));
                }
            }
        }
        Ok(Self { bounds, pixels })
    }

    /// Returns the pixel rectangle of the grid.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.bounds.width()
    }

    /// The number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.bounds.height()
    }

    /// Whether the grid has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Returns the number of pixels as a `u32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn num_pixels(&self) -> u32 {
        self.pixels.len() as u32
    }

    /// Returns the pixels in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Consumes the grid and returns its pixels in row-major order.
    #[must_use]
    pub fn into_pixels(self) -> Vec<Color> {
        self.pixels
    }

    /// Returns the pixel at `(x, y)`, or `None` if it lies outside the grid.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        if self.bounds.contains(x, y) {
            let row = self.bounds.min_y.abs_diff(y) as usize;
            let col = self.bounds.min_x.abs_diff(x) as usize;
            self.pixels.get(row * self.width() as usize + col).copied()
        } else {
            None
        }
    }

    /// Returns an iterator over the rows of the grid, from top to bottom.
    pub fn rows(&self) -> ChunksExact<'_, Color> {
        self.pixels.chunks_exact(self.width().max(1) as usize)
    }
}

#[cfg(feature = "image")]
impl TryFrom<&RgbaImage> for PixelGrid {
    type Error = GridError;

    fn try_from(image: &RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        let (Ok(max_x), Ok(max_y)) = (i32::try_from(width), i32::try_from(height)) else {
            return Err(GridError::DimensionOutOfRange { width, height });
        };
        let bounds = Bounds::new(0, 0, max_x, max_y);
        let len = Self::checked_len(bounds)?;
        let buf = &image.as_raw()[..(len * 4)];
        let buf: &[Color] = buf.components_as();
        Self::new(bounds, buf.to_vec())
    }
}

#[cfg(feature = "image")]
impl PixelGrid {
    /// Copies the grid into an [`RgbaImage`] whose origin is the grid's top left corner.
    #[must_use]
    pub fn to_rgba_image(&self) -> RgbaImage {
        let buf = self.pixels.clone().into_components();

        #[allow(clippy::expect_used)]
        {
            // pixels.len() is equal to width * height,
            // so buf is large enough by nature of its construction
            RgbaImage::from_raw(self.width(), self.height(), buf).expect("large enough buffer")
        }
    }
}

/// The number of workers (column strips) a parallel transform splits an image into.
///
/// This is a simple new type wrapper around [`NonZeroUsize`].
/// The default is the detected hardware concurrency of the host.
///
/// # Examples
/// ```
/// # use color_schemorator::Workers;
/// let pinned = Workers::new(4).unwrap();
/// assert_eq!(pinned.get(), 4);
/// assert_eq!(Workers::new(0), None);
/// assert_eq!(Workers::from_clamped(0), Workers::ONE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Workers(NonZeroUsize);

impl Workers {
    /// A single worker.
    pub const ONE: Self = Self(NonZeroUsize::MIN);

    /// Creates a new [`Workers`], returning `None` if `count` is zero.
    #[must_use]
    pub fn new(count: usize) -> Option<Self> {
        NonZeroUsize::new(count).map(Self)
    }

    /// Creates a new [`Workers`] by clamping `count` to be at least `1`.
    #[must_use]
    pub fn from_clamped(count: usize) -> Self {
        Self::new(count).unwrap_or(Self::ONE)
    }

    /// Returns the hardware concurrency of the host, or one worker if it cannot be determined.
    #[must_use]
    pub fn detect() -> Self {
        thread::available_parallelism().map_or(Self::ONE, Self)
    }

    /// Gets the number of workers.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for Workers {
    fn default() -> Self {
        Self::detect()
    }
}

impl From<NonZeroUsize> for Workers {
    fn from(value: NonZeroUsize) -> Self {
        Self(value)
    }
}

impl Display for Workers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// This type is used to specify the maximum number of colors an extracted palette may contain.
///
/// This is a simple new type wrapper around `u16` with the invariant that it must be
/// less than or equal to [`MAX_COLORS`].
///
/// # Examples
/// ```
/// # use color_schemorator::{PaletteSize, AboveMaxLen};
/// # fn main() -> Result<(), AboveMaxLen<u16>> {
/// let size = PaletteSize::try_from(16u16)?;
/// let size: PaletteSize = 100u16.try_into()?;
/// let size = PaletteSize::from_clamped(1024);
/// assert_eq!(size, PaletteSize::MAX);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PaletteSize(u16);

impl PaletteSize {
    /// The maximum supported palette size (given by [`MAX_COLORS`]).
    pub const MAX: Self = Self(MAX_COLORS);

    /// Gets the inner `u16` value.
    #[must_use]
    pub const fn into_inner(self) -> u16 {
        self.0
    }

    /// Creates a [`PaletteSize`] by clamping the given `u16` to be less than or equal to [`MAX_COLORS`].
    #[must_use]
    pub const fn from_clamped(value: u16) -> Self {
        if value <= MAX_COLORS {
            Self(value)
        } else {
            Self(MAX_COLORS)
        }
    }
}

impl Default for PaletteSize {
    fn default() -> Self {
        Self::MAX
    }
}

impl From<PaletteSize> for u16 {
    fn from(val: PaletteSize) -> Self {
        val.into_inner()
    }
}

impl TryFrom<u16> for PaletteSize {
    type Error = AboveMaxLen<u16>;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value <= MAX_COLORS {
            Ok(PaletteSize(value))
        } else {
            Err(AboveMaxLen(MAX_COLORS))
        }
    }
}

impl Display for PaletteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}
