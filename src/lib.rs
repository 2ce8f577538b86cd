//! A library for remapping images onto a fixed color palette and for extracting
//! dominant-color palettes from images.
//!
//! `color_schemorator` works on decoded, in-memory pixel grids and parsed palettes.
//! Decoding and encoding image containers is left to the [`io`] module (or to the caller).
//!
//! # Features
//! `color_schemorator` has several `cargo` features that can be turned off or on:
//! - `threads`: exposes parallel versions of the remapper and the extractor via [`rayon`].
//! - `image`: enables integration with the [`image`] crate and the file helpers in [`io`].
//! - `cli`: builds the `csor` command-line tool.
//!
//! # Example
//! ```
//! # use color_schemorator::{remap, Bounds, Palette, PixelGrid};
//! # use palette::Srgba;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let palette: Palette = "#000\n#fff // white".parse()?;
//!
//! let grid = PixelGrid::filled(Bounds::from_size(4, 4), Srgba::new(200, 210, 190, 255))?;
//! let remapped = remap::remap(&grid, &palette)?;
//!
//! assert!(remapped.pixels().iter().all(|&c| c == Srgba::new(255, 255, 255, 255)));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(
    clippy::pedantic,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc
)]

mod error;
mod palettes;
mod parse;
mod types;

pub mod extract;
pub mod partition;
pub mod remap;

#[cfg(feature = "image")]
pub mod io;

pub use palettes::*;
pub use error::*;
pub use extract::{dominant_palette, ColorFrequencies};
pub use parse::*;
pub use types::*;

#[cfg(feature = "threads")]
pub use extract::dominant_palette_par;

/// The maximum supported image size in number of pixels is `u32::MAX`.
pub const MAX_PIXELS: u32 = u32::MAX;

/// The minimum number of colors a parsed palette must contain is `2`.
pub const MIN_COLORS: u16 = 2;

/// The maximum supported number of palette colors is `128`.
pub const MAX_COLORS: u16 = 128;

/// The number of invalid palette lines reported individually before the rest are summarized.
pub const MAX_PARSE_ERRORS: usize = 15;

/// `MAX_COLORS` as a `usize` for `Vec` lengths.
pub(crate) const MAX_K: usize = MAX_COLORS as usize;

/// `MIN_COLORS` as a `usize`.
pub(crate) const MIN_K: usize = MIN_COLORS as usize;
