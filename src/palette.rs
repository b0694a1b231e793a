use crate::{PhotermError, Result};
use log::debug;

/// Number of brightness levels a palette covers
pub const PALETTE_SIZE: usize = 256;

/// Solid block glyphs: color only, no shape information
pub const NORMAL_GLYPHS: &str = "█████";

/// Shaded block ramp
pub const TURBO_GFX_GLYPHS: &str = " ░▒▓█";

/// Short ASCII ramp
pub const ASCIIFY_GLYPHS: &str = " .*$@";

/// Long ASCII ramp, densest glyph first
pub const ASCIIFY2_GLYPHS: &str =
    r##"$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\|()1{}[]?-_+~<>i!lI;:,^`'. ","##;

/// Stretch `source` to exactly `len` glyphs.
///
/// Slot `i` takes source glyph `i % n`; slots are then stably ordered by that
/// source index, so repeats of a glyph sit next to each other
/// (`stretch("AB", 4) == "AABB"`). A source of `len` glyphs or more is
/// truncated to its first `len`.
pub fn stretch(source: &str, len: usize) -> String {
    let glyphs: Vec<char> = source.chars().collect();
    let n = glyphs.len();
    if n == 0 {
        return String::new();
    }
    if n >= len {
        return glyphs.into_iter().take(len).collect();
    }

    let mut slots: Vec<(usize, char)> = (0..len).map(|i| (i % n, glyphs[i % n])).collect();
    slots.sort_by_key(|&(idx, _)| idx);
    slots.into_iter().map(|(_, glyph)| glyph).collect()
}

/// A 256-entry brightness to glyph lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    glyphs: [char; PALETTE_SIZE],
}

impl Palette {
    /// Concatenate the glyph sources in order and stretch them over the palette
    pub fn from_sources<S: AsRef<str>>(sources: &[S]) -> Result<Self> {
        let concat: String = sources.iter().map(|s| s.as_ref()).collect();
        if concat.is_empty() {
            return Err(PhotermError::InvalidConfig(
                "palette needs at least one glyph".to_string(),
            ));
        }

        let mut glyphs = [' '; PALETTE_SIZE];
        for (slot, glyph) in glyphs.iter_mut().zip(stretch(&concat, PALETTE_SIZE).chars()) {
            *slot = glyph;
        }

        debug!("Built palette from {} source glyphs", concat.chars().count());
        Ok(Self { glyphs })
    }

    pub fn from_glyphs(glyphs: &str) -> Result<Self> {
        Self::from_sources(&[glyphs])
    }

    /// Glyph for an 8-bit brightness
    pub fn glyph(&self, brightness: u8) -> char {
        self.glyphs[brightness as usize]
    }

    pub fn glyphs(&self) -> &[char; PALETTE_SIZE] {
        &self.glyphs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stretch_groups_repeats() {
        assert_eq!(stretch("AB", 4), "AABB");
        assert_eq!(stretch("ABC", 7), "AAABBCC");
        assert_eq!(stretch("A", 3), "AAA");
    }

    #[test]
    fn test_stretch_always_fills_palette() {
        for source in ["#", "AB", " ░▒▓█", ASCIIFY2_GLYPHS, "x".repeat(255).as_str()] {
            assert_eq!(stretch(source, PALETTE_SIZE).chars().count(), PALETTE_SIZE, "{}", source);
        }
    }

    #[test]
    fn test_stretch_truncates_long_sources() {
        let long: String = (0..300u32).map(|i| char::from_u32(0x4e00 + i).unwrap()).collect();
        let stretched = stretch(&long, PALETTE_SIZE);
        assert_eq!(stretched.chars().count(), PALETTE_SIZE);
        assert!(long.starts_with(&stretched));
    }

    #[test]
    fn test_stretch_keeps_multibyte_glyphs_whole() {
        let stretched = stretch(TURBO_GFX_GLYPHS, 10);
        assert_eq!(stretched, "  ░░▒▒▓▓██");
    }

    #[test]
    fn test_palette_from_sources_concatenates_in_order() {
        let palette = Palette::from_sources(&["A", "B"]).unwrap();
        assert_eq!(palette.glyph(0), 'A');
        assert_eq!(palette.glyph(127), 'A');
        assert_eq!(palette.glyph(128), 'B');
        assert_eq!(palette.glyph(255), 'B');
    }

    #[test]
    fn test_ramp_runs_dark_to_bright() {
        let palette = Palette::from_glyphs(ASCIIFY_GLYPHS).unwrap();
        assert_eq!(palette.glyph(0), ' ');
        assert_eq!(palette.glyph(255), '@');
    }

    #[test]
    fn test_empty_palette_is_rejected() {
        assert!(Palette::from_glyphs("").is_err());
        assert!(Palette::from_sources::<&str>(&[]).is_err());
        assert!(Palette::from_sources(&["", ""]).is_err());
    }
}
