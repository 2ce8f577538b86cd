//! File helpers for reading and writing palettes and images.
//!
//! Images must have a `.jpg`, `.jpeg`, or `.png` extension (matched case-sensitively).
//! Input images are limited to [`MAX_IMAGE_BYTES`] and palette files to [`MAX_PALETTE_BYTES`].

use crate::{GridError, Palette, ParsePaletteError, PixelGrid};
use image::{
    codecs::{jpeg::JpegEncoder, png::PngEncoder},
    DynamicImage, ImageError, ImageFormat,
};
use std::{
    ffi::OsStr,
    fmt::{self, Display},
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

/// The maximum size of an input image file is 15 MiB.
pub const MAX_IMAGE_BYTES: u64 = 15 * 1024 * 1024;

/// The maximum size of a palette file is 1 MiB.
pub const MAX_PALETTE_BYTES: u64 = 1024 * 1024;

/// The JPEG quality used when saving images.
pub const JPEG_QUALITY: u8 = 90;

/// The role a file plays, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// An image to read.
    InputImage,
    /// An image to write.
    OutputImage,
    /// A palette text file.
    Palette,
}

impl Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FileKind::InputImage => "input image",
                FileKind::OutputImage => "output image",
                FileKind::Palette => "palette",
            }
        )
    }
}

/// An error returned by the file helpers.
#[derive(Debug, Error)]
pub enum IoError {
    /// The image path does not end in a supported extension.
    #[error("invalid file extension on {kind} file: {extension}")]
    InvalidExtension {
        /// The role of the file.
        kind: FileKind,
        /// The extension found, including the leading dot, or an empty string.
        extension: String,
    },
    /// The file is above the size limit for its kind.
    #[error("{kind} file size {size} bytes exceeds {max_mb}MB")]
    FileTooLarge {
        /// The role of the file.
        kind: FileKind,
        /// The size of the file in bytes.
        size: u64,
        /// The size limit in MiB.
        max_mb: u64,
    },
    /// The file could not be read or written.
    #[error("could not access {}", .path.display())]
    Io {
        /// The path of the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The image could not be decoded.
    #[error("error decoding image {}", .path.display())]
    Decode {
        /// The path of the image.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: ImageError,
    },
    /// The image could not be encoded.
    #[error("error encoding new image {}", .path.display())]
    Encode {
        /// The path of the image.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: ImageError,
    },
    /// The palette file failed validation.
    #[error("invalid palette file {}", .path.display())]
    Palette {
        /// The path of the palette file.
        path: PathBuf,
        /// Every problem found in the file.
        #[source]
        source: ParsePaletteError,
    },
    /// The decoded image could not be converted into a [`PixelGrid`].
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Wraps a [`std::io::Error`] with the path it occurred on.
fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> IoError + '_ {
    move |source| IoError::Io { path: path.to_path_buf(), source }
}

/// Checks that `path` has a supported image extension and returns the matching format.
///
/// # Errors
/// Returns [`IoError::InvalidExtension`] if the extension is not
/// `jpg`, `jpeg`, or `png`.
///
/// # Examples
/// ```
/// # use color_schemorator::io::{validate_extension, FileKind};
/// # use image::ImageFormat;
/// assert_eq!(validate_extension("photo.jpeg".as_ref(), FileKind::InputImage).unwrap(), ImageFormat::Jpeg);
/// assert!(validate_extension("photo.gif".as_ref(), FileKind::InputImage).is_err());
/// ```
pub fn validate_extension(path: &Path, kind: FileKind) -> Result<ImageFormat, IoError> {
    let extension = path.extension().and_then(OsStr::to_str);
    match extension {
        Some("jpg" | "jpeg") => Ok(ImageFormat::Jpeg),
        Some("png") => Ok(ImageFormat::Png),
        _ => Err(IoError::InvalidExtension {
            kind,
            extension: path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default(),
        }),
    }
}

/// Checks that the file at `path` is at most `max` bytes.
fn check_size(path: &Path, kind: FileKind, max: u64) -> Result<(), IoError> {
    let size = fs::metadata(path).map_err(io_error(path))?.len();
    if size > max {
        Err(IoError::FileTooLarge { kind, size, max_mb: max / (1024 * 1024) })
    } else {
        Ok(())
    }
}

/// Reads and parses the palette file at `path`.
///
/// # Errors
/// Returns an error if the file is larger than [`MAX_PALETTE_BYTES`], cannot be read as UTF-8,
/// or fails palette validation. In the last case, every problem is reported at once.
pub fn read_palette(path: impl AsRef<Path>) -> Result<Palette, IoError> {
    let path = path.as_ref();
    check_size(path, FileKind::Palette, MAX_PALETTE_BYTES)?;
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    text.parse::<Palette>().map_err(|source| IoError::Palette {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `palette` to `path`, one `#RRGGBB` token per line with no trailing newline.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_palette(path: impl AsRef<Path>, palette: &Palette) -> Result<(), IoError> {
    let path = path.as_ref();
    fs::write(path, palette.to_hex_string()).map_err(io_error(path))
}

/// Decodes the image at `path` into a [`PixelGrid`] with its origin at `(0, 0)`.
///
/// # Errors
/// Returns an error if the extension is not supported, the file is larger than
/// [`MAX_IMAGE_BYTES`], or the image cannot be decoded.
pub fn open_image(path: impl AsRef<Path>) -> Result<PixelGrid, IoError> {
    let path = path.as_ref();
    validate_extension(path, FileKind::InputImage)?;
    check_size(path, FileKind::InputImage, MAX_IMAGE_BYTES)?;

    let image = image::open(path).map_err(|source| IoError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(PixelGrid::try_from(&image.into_rgba8())?)
}

/// Encodes `grid` to `path` as PNG (with alpha) or JPEG (without alpha) depending on the extension.
///
/// JPEG images are written with a quality of [`JPEG_QUALITY`].
///
/// # Errors
/// Returns an error if the extension is not supported
/// or the image cannot be created or encoded.
pub fn save_image(path: impl AsRef<Path>, grid: &PixelGrid) -> Result<(), IoError> {
    let path = path.as_ref();
    let format = validate_extension(path, FileKind::OutputImage)?;
    let image = grid.to_rgba_image();

    let encode_error = |source: ImageError| IoError::Encode { path: path.to_path_buf(), source };

    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);

    match format {
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image).into_rgb8();
            JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
                .encode_image(&rgb)
                .map_err(encode_error)?;
        }
        _ => image
            .write_with_encoder(PngEncoder::new(&mut writer))
            .map_err(encode_error)?,
    }

    // the buffered tail is only written by this flush
    writer.flush().map_err(io_error(path))
}
