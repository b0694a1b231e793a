use crate::controls::{FocusControls, PathControls, Rgb, ScaleControls, ScaleFactors, StyleControls};
use crate::palette::{ASCIIFY2_GLYPHS, ASCIIFY_GLYPHS, NORMAL_GLYPHS, TURBO_GFX_GLYPHS};
use clap::Parser;
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Serialize, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to an image, a directory of frames, or a video
    #[arg(required_unless_present = "stdin")]
    pub path: Option<PathBuf>,

    /// Overall image scale
    #[arg(short, long, default_value_t = 1.0)]
    pub scale: f64,

    /// Widen the image to compensate for tall terminal cells
    #[arg(short = 'w', long, visible_alias = "wide", default_value_t = 1.0)]
    pub squash: f64,

    /// Read a single image from stdin
    #[arg(short = 'i', long)]
    pub stdin: bool,

    /// Playback mode
    #[arg(short, long, value_enum, default_value = "image")]
    pub mode: Mode,

    /// Glyph set mapped to brightness levels
    #[arg(short, long, value_enum, default_value = "normal")]
    pub charset: Charset,

    /// Custom glyphs to render with, overriding the charset
    #[arg(long, value_name = "GLYPHS")]
    pub custom: Option<String>,

    /// Left edge of the focus region
    #[arg(long = "x-org", default_value_t = 0)]
    pub x_origin: u32,

    /// Top edge of the focus region
    #[arg(long = "y-org", default_value_t = 0)]
    pub y_origin: u32,

    /// Width of the focus region (0 = whole image)
    #[arg(long, default_value_t = 0)]
    pub width: u32,

    /// Height of the focus region (0 = whole image)
    #[arg(long, default_value_t = 0)]
    pub height: u32,

    /// Hue rotation angle in radians
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub hue: f32,

    /// Upper limit on playback frames per second (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub fps: u32,

    /// Render glyphs in bold
    #[arg(short, long)]
    pub bold: bool,

    /// Background color for every cell
    #[arg(long, value_name = "R:G:B")]
    pub bg: Option<Rgb>,

    /// Transcoder program used for video modes
    #[arg(long, default_value = "ffmpeg")]
    pub transcoder: String,

    /// Write the parsed arguments as JSON next to the input
    #[arg(long)]
    pub dump_args: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(clap::ValueEnum, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Print a single image
    #[value(alias = "I")]
    Image,
    /// Play every image in a directory
    #[value(alias = "R")]
    Dir,
    /// Play a video streamed through the transcoder
    #[value(alias = "S")]
    Stream,
    /// Extract a video's frames next to it, then play them
    #[value(alias = "L")]
    Batch,
}

impl Mode {
    /// Whether the mode plays a sequence rather than one still
    pub fn is_animated(&self) -> bool {
        !matches!(self, Mode::Image)
    }
}

#[derive(clap::ValueEnum, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Charset {
    /// Solid blocks
    Normal,
    /// Shaded blocks
    TurboGfx,
    /// Five-step ASCII ramp
    Asciify,
    /// Long ASCII ramp
    Asciify2,
}

impl Charset {
    pub fn glyphs(&self) -> &'static str {
        match self {
            Charset::Normal => NORMAL_GLYPHS,
            Charset::TurboGfx => TURBO_GFX_GLYPHS,
            Charset::Asciify => ASCIIFY_GLYPHS,
            Charset::Asciify2 => ASCIIFY2_GLYPHS,
        }
    }
}

impl Cli {
    /// Validate command line arguments
    pub fn validate(&self) -> Result<(), String> {
        self.scale_factors().validate()?;

        if !self.hue.is_finite() {
            return Err("Hue angle must be a finite number".to_string());
        }

        if let Some(custom) = &self.custom {
            if custom.is_empty() {
                return Err("Custom glyphs must not be empty".to_string());
            }
        }

        if self.stdin {
            if self.mode != Mode::Image {
                return Err("Reading from stdin is only supported in image mode".to_string());
            }
            if atty::is(atty::Stream::Stdin) {
                return Err("Stdin is a terminal; pipe an image in".to_string());
            }
            return Ok(());
        }

        let path = match &self.path {
            Some(path) => path,
            None => return Err("No input path given".to_string()),
        };

        if !path.exists() {
            return Err(format!("Input path does not exist: {}", path.display()));
        }

        match self.mode {
            Mode::Dir if !path.is_dir() => Err(format!(
                "Directory mode needs a directory: {}",
                path.display()
            )),
            Mode::Image | Mode::Stream | Mode::Batch if !path.is_file() => {
                Err(format!("Expected a file: {}", path.display()))
            }
            _ => Ok(()),
        }
    }

    /// Glyphs for the palette: the custom string if given, else the charset
    pub fn glyphs(&self) -> &str {
        self.custom.as_deref().unwrap_or_else(|| self.charset.glyphs())
    }

    /// Where the argument dump goes: the input path with a `.json` extension
    pub fn dump_path(&self) -> Option<PathBuf> {
        self.path.as_ref().map(|path| path.with_extension("json"))
    }

    /// Serialise the parsed arguments as pretty JSON next to the input
    pub fn dump_args(&self) -> anyhow::Result<Option<PathBuf>> {
        let Some(dump_path) = self.dump_path() else {
            return Ok(None);
        };
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&dump_path, json)?;
        info!("Wrote arguments to {}", dump_path.display());
        Ok(Some(dump_path))
    }
}

impl ScaleControls for Cli {
    fn scale(&self) -> f64 {
        self.scale
    }

    fn squash(&self) -> f64 {
        self.squash
    }
}

impl PathControls for Cli {
    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn reads_stdin(&self) -> bool {
        self.stdin
    }
}

impl FocusControls for Cli {
    fn x_origin(&self) -> u32 {
        self.x_origin
    }

    fn y_origin(&self) -> u32 {
        self.y_origin
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

impl StyleControls for Cli {
    fn is_bold(&self) -> bool {
        self.bold
    }

    fn hue_angle(&self) -> f32 {
        self.hue
    }

    fn background(&self) -> Option<Rgb> {
        self.bg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::FocusSpec;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("photerm").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["pic.png"]);
        assert_eq!(cli.mode, Mode::Image);
        assert_eq!(cli.charset, Charset::Normal);
        assert_eq!(cli.scale_factors(), ScaleFactors::new(1.0, 1.0));
        assert_eq!(cli.focus(), FocusSpec::default());
        assert_eq!(cli.fps, 0);
        assert_eq!(cli.transcoder, "ffmpeg");
        assert_eq!(cli.glyphs(), NORMAL_GLYPHS);
    }

    #[test]
    fn test_full_flag_set() {
        let cli = parse(&[
            "clip.mp4", "-s", "0.5", "--wide", "2", "-m", "stream", "-c", "asciify", "--x-org", "3",
            "--y-org", "4", "--width", "10", "--height", "6", "--hue", "-1.5", "--fps", "12", "-b",
            "--bg", "1:2:3",
        ]);
        assert_eq!(cli.scale_factors(), ScaleFactors::new(0.5, 2.0));
        assert_eq!(cli.mode, Mode::Stream);
        assert_eq!(cli.glyphs(), ASCIIFY_GLYPHS);
        assert_eq!(
            cli.focus(),
            FocusSpec {
                x_origin: 3,
                y_origin: 4,
                width: 10,
                height: 6
            }
        );
        let style = cli.style();
        assert!(style.bold);
        assert_eq!(style.hue_angle, -1.5);
        assert_eq!(style.background, Some(Rgb::new(1, 2, 3)));
        assert_eq!(cli.fps, 12);
    }

    #[test]
    fn test_single_letter_mode_aliases() {
        assert_eq!(parse(&["x", "-m", "I"]).mode, Mode::Image);
        assert_eq!(parse(&["x", "-m", "R"]).mode, Mode::Dir);
        assert_eq!(parse(&["x", "-m", "L"]).mode, Mode::Batch);
        assert!(Mode::Dir.is_animated());
        assert!(!Mode::Image.is_animated());
    }

    #[test]
    fn test_custom_glyphs_override_charset() {
        let cli = parse(&["x", "-c", "turbo-gfx", "--custom", "ab"]);
        assert_eq!(cli.glyphs(), "ab");
    }

    #[test]
    fn test_path_required_without_stdin() {
        assert!(Cli::try_parse_from(["photerm"]).is_err());
        assert!(Cli::try_parse_from(["photerm", "--stdin"]).is_ok());
    }

    #[test]
    fn test_bad_background_is_rejected_at_parse() {
        assert!(Cli::try_parse_from(["photerm", "x", "--bg", "red"]).is_err());
    }

    #[test]
    fn test_validate() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("still.png");
        std::fs::write(&file, b"").unwrap();
        let file = file.to_str().unwrap();
        let dir_arg = dir.path().to_str().unwrap();

        assert!(parse(&[file]).validate().is_ok());
        assert!(parse(&[dir_arg, "-m", "dir"]).validate().is_ok());

        let err = parse(&["missing.png"]).validate().unwrap_err();
        assert!(err.contains("does not exist"));
        assert!(parse(&[file, "-m", "dir"]).validate().is_err());
        assert!(parse(&[dir_arg]).validate().is_err());
        assert!(parse(&[file, "-s", "0"]).validate().is_err());
        assert!(parse(&[file, "--squash=-1"]).validate().is_err());
        assert!(parse(&[file, "--custom", ""]).validate().is_err());
        assert!(parse(&["--stdin", "-m", "dir"]).validate().is_err());
    }

    #[test]
    fn test_dump_args_writes_json_next_to_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        let cli = parse(&[input.to_str().unwrap(), "--fps", "9", "--bg", "4:5:6"]);

        let written = cli.dump_args().unwrap().unwrap();
        assert_eq!(written, dir.path().join("clip.json"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(written).unwrap()).unwrap();
        assert_eq!(json["fps"], 9);
        assert_eq!(json["mode"], "Image");
        assert_eq!(json["bg"]["g"], 5);
    }
}
