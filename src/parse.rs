//! Contains the palette text parser.
//!
//! A palette text has one hex color per line. Everything after `//` on a line is a comment,
//! and lines that are empty after removing comments and surrounding whitespace are ignored.
//! Problems are collected over the whole text and reported together.

use crate::{
    Color, HexColorError, Palette, PaletteProblem, ParsePaletteError, MAX_COLORS, MAX_K,
    MAX_PARSE_ERRORS, MIN_COLORS, MIN_K,
};
use palette::{cast, Srgba};
use std::{collections::HashSet, str::FromStr};

/// The number of characters of an invalid token that are shown in an error message.
const MAX_TOKEN_CHARS: usize = 30;

/// Parses a single `#RGB` or `#RRGGBB` token into an opaque color.
///
/// Hex digits are case-insensitive, and each digit of the short form is repeated
/// (e.g., `#a1f` is the same as `#aa11ff`).
///
/// # Errors
/// Returns an error if the token does not have 4 or 7 characters,
/// does not start with `#`, or contains a non-hexadecimal digit.
///
/// # Examples
/// ```
/// # use color_schemorator::{parse_hex_color, HexColorError};
/// # use palette::Srgba;
/// assert_eq!(parse_hex_color("#fff"), Ok(Srgba::new(255, 255, 255, 255)));
/// assert_eq!(parse_hex_color("#123aBc"), Ok(Srgba::new(0x12, 0x3a, 0xbc, 255)));
/// assert_eq!(parse_hex_color("123456"), Err(HexColorError::InvalidLength(6)));
/// ```
pub fn parse_hex_color(token: &str) -> Result<Color, HexColorError> {
    let num_chars = token.chars().count();
    if num_chars != 4 && num_chars != 7 {
        return Err(HexColorError::InvalidLength(num_chars));
    }

    let digits = token.strip_prefix('#').ok_or(HexColorError::MissingHash)?;

    let mut nibbles = [0u8; 6];
    let mut len = 0;
    for c in digits.chars() {
        let digit = c.to_digit(16).ok_or(HexColorError::InvalidDigit(c))?;
        // the token has at most 7 characters, so at most 6 digits follow the '#'
        #[allow(clippy::cast_possible_truncation)]
        {
            nibbles[len] = digit as u8;
        }
        len += 1;
    }

    let [r, g, b] = match nibbles[..len] {
        [r, g, b] => [r, g, b].map(|n| (n << 4) | n),
        [r1, r0, g1, g0, b1, b0] => [(r1 << 4) | r0, (g1 << 4) | g0, (b1 << 4) | b0],
        _ => return Err(HexColorError::InvalidLength(num_chars)),
    };

    Ok(Srgba::new(r, g, b, u8::MAX))
}

/// Removes a trailing `//` comment and surrounding whitespace from a line.
fn strip_comment(line: &str) -> &str {
    line.split_once("//").map_or(line, |(content, _)| content).trim()
}

/// Shortens a token for display, marking it with `...` if anything was cut off.
fn truncate_token(token: &str) -> String {
    if token.chars().count() > MAX_TOKEN_CHARS {
        let mut shortened = token.chars().take(MAX_TOKEN_CHARS).collect::<String>();
        shortened.push_str("...");
        shortened
    } else {
        token.to_owned()
    }
}

/// Builds a [`Palette`] line by line while collecting every validation problem.
///
/// Colors are kept in the order they are first seen; repeated colors are skipped.
/// Invalid lines are recorded until [`MAX_PARSE_ERRORS`] of them have been seen.
/// After that, no more colors are added and later invalid lines are only counted.
///
/// # Examples
/// ```
/// # use color_schemorator::PaletteBuilder;
/// let mut builder = PaletteBuilder::new();
/// builder.push_line(1, "#000 // black");
/// builder.push_line(2, "");
/// builder.push_line(3, "#fff");
/// builder.push_line(4, "#000");
/// assert_eq!(builder.colors().len(), 2);
///
/// let palette = builder.finish().unwrap();
/// assert_eq!(palette.to_string(), "#000000\n#FFFFFF");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PaletteBuilder {
    /// The distinct colors in first-occurrence order.
    colors: Vec<Color>,
    /// The channels of every color in `colors`.
    seen: HashSet<[u8; 4]>,
    /// The invalid lines recorded so far.
    problems: Vec<PaletteProblem>,
    /// The number of invalid lines seen after the report cap was reached.
    unreported: usize,
    /// Whether a distinct color was dropped because the palette was full.
    overflowed: bool,
}

impl PaletteBuilder {
    /// Creates a new, empty [`PaletteBuilder`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the distinct colors collected so far.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Whether [`MAX_PARSE_ERRORS`] invalid lines have been recorded.
    #[must_use]
    pub fn is_capped(&self) -> bool {
        self.problems.len() >= MAX_PARSE_ERRORS
    }

    /// Adds a color unless it is a duplicate or the palette is already full.
    fn push_color(&mut self, color: Color) {
        let key = cast::into_array(color);
        if self.seen.contains(&key) {
            return;
        }

        if self.colors.len() >= MAX_K {
            self.overflowed = true;
        } else {
            self.seen.insert(key);
            self.colors.push(color);
        }
    }

    /// Processes one line of palette text.
    ///
    /// `line_number` is the 1-based position of the line in the palette text
    /// and is only used for error messages.
    pub fn push_line(&mut self, line_number: usize, line: &str) {
        let token = strip_comment(line);
        if token.is_empty() {
            return;
        }

        let color = parse_hex_color(token);

        if self.is_capped() {
            if color.is_err() {
                self.unreported += 1;
            }
            return;
        }

        match color {
            Ok(color) => self.push_color(color),
            Err(reason) => self.problems.push(PaletteProblem::InvalidLine {
                line: line_number,
                token: truncate_token(token),
                reason,
            }),
        }
    }

    /// Validates the collected colors and returns the finished [`Palette`].
    ///
    /// # Errors
    /// Returns every recorded problem if any line was invalid, if there are fewer than
    /// [`MIN_COLORS`] distinct colors, or if there were more than [`MAX_COLORS`].
    /// The count-limit problem, if any, comes first.
    pub fn finish(self) -> Result<Palette, ParsePaletteError> {
        let Self { colors, mut problems, unreported, overflowed, .. } = self;

        if overflowed {
            problems.insert(0, PaletteProblem::TooManyColors { max: MAX_COLORS });
        } else if colors.len() < MIN_K {
            problems.insert(0, PaletteProblem::TooFewColors { min: MIN_COLORS });
        }

        if problems.is_empty() && unreported == 0 {
            Ok(Palette::new_unchecked(colors))
        } else {
            Err(ParsePaletteError { problems, unreported, partial: colors })
        }
    }
}

/// Parses palette text given as a sequence of lines.
///
/// See [`PaletteBuilder`] for the rules applied to each line.
///
/// # Errors
/// Returns a [`ParsePaletteError`] listing every problem found.
pub fn parse_palette<'a>(
    lines: impl IntoIterator<Item = &'a str>,
) -> Result<Palette, ParsePaletteError> {
    let mut builder = PaletteBuilder::new();
    for (i, line) in lines.into_iter().enumerate() {
        builder.push_line(i + 1, line);
    }
    builder.finish()
}

impl FromStr for Palette {
    type Err = ParsePaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_palette(s.lines())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{hex_string, tests::*};

    fn opaque(r: u8, g: u8, b: u8) -> Color {
        Srgba::new(r, g, b, 255)
    }

    #[test]
    fn valid_tokens() {
        assert_eq!(parse_hex_color("#fff"), Ok(opaque(255, 255, 255)));
        assert_eq!(parse_hex_color("#ffffff"), Ok(opaque(255, 255, 255)));
        assert_eq!(parse_hex_color("#000"), Ok(opaque(0, 0, 0)));
        assert_eq!(parse_hex_color("#000000"), Ok(opaque(0, 0, 0)));
        assert_eq!(parse_hex_color("#123abc"), Ok(opaque(0x12, 0x3a, 0xbc)));
        assert_eq!(parse_hex_color("#123ABC"), Ok(opaque(0x12, 0x3a, 0xbc)));
        assert_eq!(parse_hex_color("#a1F"), Ok(opaque(0xaa, 0x11, 0xff)));
    }

    #[test]
    fn invalid_tokens() {
        assert_eq!(parse_hex_color("123456"), Err(HexColorError::InvalidLength(6)));
        assert_eq!(parse_hex_color("1234567"), Err(HexColorError::MissingHash));
        assert_eq!(parse_hex_color("#12g456"), Err(HexColorError::InvalidDigit('g')));
        assert_eq!(parse_hex_color("#1234"), Err(HexColorError::InvalidLength(5)));
        assert_eq!(parse_hex_color("#+12"), Err(HexColorError::InvalidDigit('+')));
        assert_eq!(parse_hex_color("#é12"), Err(HexColorError::InvalidDigit('é')));
        assert_eq!(parse_hex_color("#ab\u{e9}"), Err(HexColorError::InvalidDigit('\u{e9}')));
        assert_eq!(parse_hex_color("#abcdé"), Err(HexColorError::InvalidLength(6)));
        assert!(parse_hex_color("").is_err());
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let text = "// header comment\n\n  #000   // black\n\t\n#fff//white\n   // indented comment";
        let palette: Palette = text.parse().unwrap();
        assert_eq!(palette.colors(), &[opaque(0, 0, 0), opaque(255, 255, 255)]);
    }

    #[test]
    fn duplicates_are_skipped_in_first_occurrence_order() {
        let lines = ["#ff0000", "#00f", "#F00", "#0000ff", "#0f0", "#ff0000"];
        let palette = parse_palette(lines).unwrap();
        assert_eq!(
            palette.colors(),
            &[opaque(255, 0, 0), opaque(0, 0, 255), opaque(0, 255, 0)]
        );
    }

    #[test]
    fn line_numbers_count_blank_and_comment_lines() {
        let text = "#000\n\n// comment\n#12g456\n#fff";
        let err = text.parse::<Palette>().unwrap_err();

        assert_eq!(
            err.problems(),
            &[PaletteProblem::InvalidLine {
                line: 4,
                token: "#12g456".to_owned(),
                reason: HexColorError::InvalidDigit('g'),
            }]
        );
        assert_eq!(
            err.to_string(),
            "Error on line 4: invalid hex color '#12g456' ('g' is not a hexadecimal digit)"
        );
        assert_eq!(err.partial_colors(), &[opaque(0, 0, 0), opaque(255, 255, 255)]);
    }

    #[test]
    fn long_tokens_are_truncated() {
        let token = "x".repeat(40);
        let err = parse_palette(["#000", "#fff", token.as_str()]).unwrap_err();

        let PaletteProblem::InvalidLine { token, .. } = &err.problems()[0] else {
            panic!("expected an invalid line");
        };
        assert_eq!(token, &format!("{}...", "x".repeat(30)));

        let exact = "y".repeat(30);
        let err = parse_palette(["#000", "#fff", exact.as_str()]).unwrap_err();
        let PaletteProblem::InvalidLine { token, .. } = &err.problems()[0] else {
            panic!("expected an invalid line");
        };
        assert_eq!(token, &exact);
    }

    #[test]
    fn single_color_fails_with_minimum_first() {
        let err = parse_palette(["#abcdef", "#abcdef", "oops"]).unwrap_err();

        assert_eq!(err.problems()[0], PaletteProblem::TooFewColors { min: MIN_COLORS });
        assert_eq!(err.problems().len(), 2);
        assert!(err
            .to_string()
            .starts_with("Minimum amount of colors in palette is 2\nError on line 3:"));
    }

    #[test]
    fn empty_text_fails_with_minimum() {
        let err = "".parse::<Palette>().unwrap_err();
        assert_eq!(err.problems(), &[PaletteProblem::TooFewColors { min: MIN_COLORS }]);
        assert_eq!(err.to_string(), "Minimum amount of colors in palette is 2");
    }

    #[test]
    fn too_many_colors_truncates_and_fails_with_maximum_first() {
        let colors = opaque_test_data(130, 7);
        let lines = colors.iter().map(|&c| hex_string(c)).collect::<Vec<_>>();

        let err = parse_palette(lines.iter().map(String::as_str)).unwrap_err();

        assert_eq!(err.problems(), &[PaletteProblem::TooManyColors { max: MAX_COLORS }]);
        assert_eq!(err.partial_colors(), &colors[..MAX_K]);
        assert_eq!(err.to_string(), "Max amount of colors in palette is 128");
    }

    #[test]
    fn maximum_is_reported_before_invalid_lines() {
        let colors = opaque_test_data(130, 11);
        let mut lines = colors.iter().map(|&c| hex_string(c)).collect::<Vec<_>>();
        lines.insert(5, "#nothex".to_owned());

        let err = parse_palette(lines.iter().map(String::as_str)).unwrap_err();

        assert_eq!(
            err.problems(),
            &[
                PaletteProblem::TooManyColors { max: MAX_COLORS },
                PaletteProblem::InvalidLine {
                    line: 6,
                    token: "#nothex".to_owned(),
                    reason: HexColorError::InvalidDigit('n'),
                },
            ]
        );
        assert!(err
            .to_string()
            .starts_with("Max amount of colors in palette is 128\nError on line 6:"));
    }

    #[test]
    fn repeated_colors_do_not_count_towards_maximum() {
        let colors = opaque_test_data(MAX_K, 3);
        let mut lines = colors.iter().map(|&c| hex_string(c)).collect::<Vec<_>>();
        lines.extend(lines.clone());

        let palette = parse_palette(lines.iter().map(String::as_str)).unwrap();
        assert_eq!(palette.colors(), colors.as_slice());
    }

    #[test]
    fn errors_are_capped_and_summarized() {
        let mut lines = vec!["#000", "#fff"];
        lines.extend(["bad"; 20]);
        lines.push("#f00");

        let err = parse_palette(lines).unwrap_err();

        assert_eq!(err.problems().len(), MAX_PARSE_ERRORS);
        assert_eq!(err.unreported(), 5);
        // colors after the cap are not added
        assert_eq!(err.partial_colors().len(), 2);

        let report = err.to_string();
        let report = report.lines().collect::<Vec<_>>();
        assert_eq!(report.len(), MAX_PARSE_ERRORS + 1);
        assert_eq!(
            report[0],
            "Error on line 3: invalid hex color 'bad' (expected 4 or 7 characters, found 3)"
        );
        assert_eq!(report[MAX_PARSE_ERRORS], "5 more errors...");
    }

    #[test]
    fn exactly_capped_errors_have_no_summary() {
        let mut lines = vec!["#000", "#fff"];
        lines.extend(["#zzz"; MAX_PARSE_ERRORS]);

        let err = parse_palette(lines).unwrap_err();
        assert_eq!(err.unreported(), 0);
        assert!(!err.to_string().contains("more errors"));
    }

    #[test]
    fn parsed_palette_has_no_duplicates_and_keeps_order() {
        let colors = test_data_256();
        let mut lines = Vec::new();
        for (i, &color) in colors[..100].iter().enumerate() {
            lines.push(hex_string(color));
            if i % 3 == 0 {
                lines.push(hex_string(colors[i / 2]));
            }
            if i % 7 == 0 {
                lines.push(format!("   // line {i}"));
            }
        }

        let palette = parse_palette(lines.iter().map(String::as_str)).unwrap();
        assert_eq!(palette.colors(), &colors[..100]);
    }
}
