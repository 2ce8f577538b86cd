//! Contains the [`Palette`] type and its text serialization.

use crate::{Color, PaletteError, MAX_COLORS, MAX_K, MIN_COLORS, MIN_K};
use palette::cast;
use std::{
    collections::HashSet,
    fmt::{self, Display, Write},
    ops::Deref,
};

/// An ordered list of distinct colors used as the allowed output set for remapping.
///
/// The invariants are that no two colors are equal and that there are at most
/// [`MAX_COLORS`] colors. Palettes created by parsing or through [`TryFrom`]
/// additionally have at least [`MIN_COLORS`] colors; palettes extracted from an image
/// with fewer distinct colors than that hold only the colors present in the image.
///
/// A [`Palette`] cannot be modified once created.
///
/// # Examples
/// Parse a palette from text and serialize it again:
/// ```
/// # use color_schemorator::Palette;
/// # fn main() -> Result<(), color_schemorator::ParsePaletteError> {
/// let palette: Palette = "#fff\n\n#1a2B3c // comment".parse()?;
/// assert_eq!(palette.len(), 2);
/// assert_eq!(palette.to_string(), "#FFFFFF\n#1A2B3C");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Vec<Color>);

impl Palette {
    /// Creates a [`Palette`] without validating its length or uniqueness.
    pub(crate) fn new_unchecked(colors: Vec<Color>) -> Self {
        debug_assert!(colors.len() <= MAX_K);
        Self(colors)
    }

    /// Returns the colors of the palette in order.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    /// Returns the number of colors as a `u16`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn num_colors(&self) -> u16 {
        self.0.len() as u16
    }

    /// Consumes the palette and returns its colors.
    #[must_use]
    pub fn into_inner(self) -> Vec<Color> {
        self.0
    }

    /// Serializes the palette as one uppercase `#RRGGBB` token per line
    /// with no trailing newline.
    ///
    /// This is the same as the [`Display`] output.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        self.to_string()
    }
}

/// Formats a color as an uppercase `#RRGGBB` token, ignoring alpha.
#[must_use]
pub fn hex_string(color: Color) -> String {
    let [r, g, b, _] = cast::into_array(color);
    format!("#{r:02X}{g:02X}{b:02X}")
}

impl Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &color) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            f.write_str(&hex_string(color))?;
        }
        Ok(())
    }
}

impl AsRef<[Color]> for Palette {
    fn as_ref(&self) -> &[Color] {
        self
    }
}

impl Deref for Palette {
    type Target = [Color];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Palette> for Vec<Color> {
    fn from(val: Palette) -> Self {
        val.0
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl TryFrom<Vec<Color>> for Palette {
    type Error = PaletteError;

    fn try_from(colors: Vec<Color>) -> Result<Self, Self::Error> {
        if colors.len() < MIN_K {
            return Err(PaletteError::TooFewColors { min: MIN_COLORS, found: colors.len() });
        }
        if colors.len() > MAX_K {
            return Err(PaletteError::TooManyColors { max: MAX_COLORS, found: colors.len() });
        }

        let mut seen = HashSet::with_capacity(colors.len());
        if let Some(index) = colors
            .iter()
            .position(|&color| !seen.insert(cast::into_array(color)))
        {
            return Err(PaletteError::DuplicateColor { index });
        }

        Ok(Self(colors))
    }
}

impl TryFrom<&[Color]> for Palette {
    type Error = PaletteError;

    fn try_from(colors: &[Color]) -> Result<Self, Self::Error> {
        colors.to_vec().try_into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;
    use palette::Srgba;

    #[test]
    fn serializes_uppercase_without_trailing_newline() {
        let palette = Palette::try_from(vec![
            Srgba::new(0xab, 0x01, 0xff, 255),
            Srgba::new(0, 0, 0, 255),
            Srgba::new(0x12, 0x34, 0x56, 255),
        ])
        .unwrap();

        assert_eq!(palette.to_hex_string(), "#AB01FF\n#000000\n#123456");
    }

    #[test]
    fn serialize_then_parse_preserves_colors_and_order() {
        let colors = test_data_256()[..MAX_K].to_vec();
        let palette = Palette::try_from(colors).unwrap();

        let reparsed: Palette = palette.to_string().parse().unwrap();
        assert_eq!(reparsed, palette);
    }

    #[test]
    fn try_from_validates_count() {
        let colors = test_data_256();
        assert_eq!(
            Palette::try_from(&colors[..1]),
            Err(PaletteError::TooFewColors { min: MIN_COLORS, found: 1 })
        );
        assert_eq!(
            Palette::try_from(&colors[..=MAX_K]),
            Err(PaletteError::TooManyColors { max: MAX_COLORS, found: MAX_K + 1 })
        );
        assert!(Palette::try_from(&colors[..MIN_K]).is_ok());
        assert!(Palette::try_from(&colors[..MAX_K]).is_ok());
    }

    #[test]
    fn try_from_rejects_duplicates() {
        let mut colors = test_data_256()[..10].to_vec();
        colors[7] = colors[3];
        assert_eq!(
            Palette::try_from(colors),
            Err(PaletteError::DuplicateColor { index: 7 })
        );
    }

    #[test]
    fn colors_differing_only_in_alpha_are_distinct() {
        let palette = Palette::try_from(vec![
            Srgba::new(1, 2, 3, 255),
            Srgba::new(1, 2, 3, 0),
        ]);
        assert!(palette.is_ok());
    }
}
