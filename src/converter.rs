use crate::controls::Style;
use crate::hue::HueRotator;
use crate::paint::{self, NORMALIZER};
use crate::palette::Palette;
use crate::region::Region;
use image::{GenericImageView, Rgba};
use log::debug;
use std::fmt::{self, Write};

/// The printable form of one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell<'a> {
    /// Display attributes such as bold, shared by every cell of a run
    pub display: &'a str,
    /// Background escape, shared by every cell of a run
    pub background: &'a str,
    /// Foreground color, after hue rotation
    pub color: [u8; 3],
    pub glyph: char,
}

impl Cell<'_> {
    pub fn foreground(&self) -> String {
        let [r, g, b] = self.color;
        paint::foreground(r, g, b)
    }
}

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.color;
        write!(
            f,
            "{}{}\x1b[38;2;{};{};{}m{}",
            self.display, self.background, r, g, b, self.glyph
        )
    }
}

/// Color channels widened to 16 bits and premultiplied by alpha, so transparent
/// pixels fade toward black.
fn premultiplied(pixel: Rgba<u8>) -> [u32; 3] {
    let [r, g, b, a] = pixel.0.map(|c| u32::from(c) * 0x101);
    [r, g, b].map(|c| c * a / 0xffff)
}

/// 8-bit luma of a pixel: `0.299 R + 0.587 G + 0.114 B` on alpha-premultiplied
/// channels, rounded the way a 16-bit colorimetric gray conversion rounds it.
pub fn brightness(pixel: Rgba<u8>) -> u8 {
    let [r, g, b] = premultiplied(pixel).map(u64::from);
    let y = (19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 24;
    y as u8
}

/// Turns frames into printable lines of colored glyphs
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    palette: Palette,
    rotator: HueRotator,
    display: String,
    background: String,
}

impl FrameRenderer {
    pub fn new(palette: Palette, style: Style) -> Self {
        let display = if style.bold { paint::bold() } else { String::new() };
        let background = style
            .background
            .map(|bg| paint::background(bg.r, bg.g, bg.b))
            .unwrap_or_default();

        Self {
            palette,
            rotator: HueRotator::new(style.hue_angle),
            display,
            background,
        }
    }

    /// Build the cell for a pixel. The glyph follows the pixel's brightness
    /// before hue rotation; only the color is rotated. Both use the color
    /// premultiplied by alpha.
    pub fn cell(&self, pixel: Rgba<u8>) -> Cell<'_> {
        let glyph = self.palette.glyph(brightness(pixel));
        let [r, g, b] = premultiplied(pixel).map(|c| (c >> 8) as u8);

        Cell {
            display: &self.display,
            background: &self.background,
            color: self.rotator.rotate([r, g, b]),
            glyph,
        }
    }

    /// Render the pixels inside `region` row by row. The region is clamped to
    /// the image first; an empty region renders no lines.
    pub fn render<I>(&self, image: &I, region: Region) -> Vec<String>
    where
        I: GenericImageView<Pixel = Rgba<u8>>,
    {
        let (width, height) = image.dimensions();
        let region = region.clamp_to(width, height);
        if region.is_empty() {
            return Vec::new();
        }

        let mut lines = Vec::with_capacity(region.height() as usize);
        for y in region.top..region.bottom {
            let mut line = String::with_capacity(region.width() as usize * 24 + NORMALIZER.len());
            for x in region.left..region.right {
                let cell = self.cell(image.get_pixel(x, y));
                // writing into a String cannot fail
                let _ = write!(line, "{}", cell);
            }
            line.push_str(NORMALIZER);
            lines.push(line);
        }

        debug!(
            "Rendered {}x{} cells from ({}, {})",
            region.width(),
            region.height(),
            region.left,
            region.top
        );
        lines
    }
}
