//! Capability traits through which the pipeline reads its configuration.
//!
//! Each concern gets its own small trait so a component only sees the knobs it
//! needs. [`crate::Cli`] implements all of them; tests use the plain value
//! objects defined here.

use crate::region::FocusSpec;
use crate::PhotermError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Uniform scale and horizontal squash applied to every decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactors {
    /// Multiplies the source height (and the derived width)
    pub scale: f64,
    /// Multiplies the width/height ratio to compensate for tall terminal cells
    pub squash: f64,
}

impl ScaleFactors {
    pub fn new(scale: f64, squash: f64) -> Self {
        Self { scale, squash }
    }

    /// Both factors must be finite and strictly positive
    pub fn validate(&self) -> Result<(), String> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(format!("Scale must be greater than 0, got {}", self.scale));
        }
        if !(self.squash.is_finite() && self.squash > 0.0) {
            return Err(format!("Squash must be greater than 0, got {}", self.squash));
        }
        Ok(())
    }
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self { scale: 1.0, squash: 1.0 }
    }
}

/// A plain 8-bit color, parsed from the `R:G:B` form used on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = PhotermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PhotermError::InvalidConfig(format!("expected R:G:B color, got '{}'", s));

        let mut channels = s.splitn(3, ':');
        let mut next = || -> Result<u8, PhotermError> {
            channels
                .next()
                .and_then(|c| c.trim().parse::<u8>().ok())
                .ok_or_else(invalid)
        };

        let (r, g, b) = (next()?, next()?, next()?);
        Ok(Self { r, g, b })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.r, self.g, self.b)
    }
}

/// Per-run styling applied identically to every cell of every frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Style {
    pub bold: bool,
    pub background: Option<Rgb>,
    /// Hue rotation in radians
    pub hue_angle: f32,
}

pub trait ScaleControls {
    fn scale(&self) -> f64;
    fn squash(&self) -> f64;

    fn scale_factors(&self) -> ScaleFactors {
        ScaleFactors::new(self.scale(), self.squash())
    }
}

impl ScaleControls for ScaleFactors {
    fn scale(&self) -> f64 {
        self.scale
    }

    fn squash(&self) -> f64 {
        self.squash
    }
}

pub trait PathControls {
    fn path(&self) -> Option<&Path>;
    fn reads_stdin(&self) -> bool;
}

pub trait FocusControls {
    fn x_origin(&self) -> u32;
    fn y_origin(&self) -> u32;
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn focus(&self) -> FocusSpec {
        FocusSpec {
            x_origin: self.x_origin(),
            y_origin: self.y_origin(),
            width: self.width(),
            height: self.height(),
        }
    }
}

pub trait StyleControls {
    fn is_bold(&self) -> bool;
    fn hue_angle(&self) -> f32;
    fn background(&self) -> Option<Rgb>;

    fn style(&self) -> Style {
        Style {
            bold: self.is_bold(),
            background: self.background(),
            hue_angle: self.hue_angle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_parse() {
        assert_eq!("12:34:56".parse::<Rgb>().unwrap(), Rgb::new(12, 34, 56));
        assert_eq!(" 0: 0:255".parse::<Rgb>().unwrap(), Rgb::new(0, 0, 255));
    }

    #[test]
    fn test_rgb_parse_rejects_bad_input() {
        assert!("12:34".parse::<Rgb>().is_err());
        assert!("256:0:0".parse::<Rgb>().is_err());
        assert!("red".parse::<Rgb>().is_err());
        assert!("1:2:3:4".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_rgb_display_round_trips_cli_form() {
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "1:2:3");
    }

    #[test]
    fn test_scale_factors_validation() {
        assert!(ScaleFactors::new(1.0, 1.0).validate().is_ok());
        assert!(ScaleFactors::new(0.0, 1.0).validate().is_err());
        assert!(ScaleFactors::new(1.0, -2.0).validate().is_err());
        assert!(ScaleFactors::new(f64::NAN, 1.0).validate().is_err());
        assert!(ScaleFactors::new(1.0, f64::INFINITY).validate().is_err());
    }
}
