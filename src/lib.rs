//! Photerm - a true-color terminal image and video renderer
//!
//! This crate decodes raster images (and, through an external transcoder, video
//! frames), rescales them and prints every pixel as a colored glyph using ANSI
//! true-color escape sequences. Frames flow through a small producer/consumer
//! pipeline: a frame source feeds a bounded buffer, an optional fps limiter
//! samples it, and the playback driver renders and writes each frame.

pub mod cli;
pub mod controls;
pub mod converter;
pub mod decoder;
pub mod hue;
pub mod limiter;
pub mod paint;
pub mod palette;
pub mod prelude;
pub mod region;
pub mod renderer;
pub mod scaler;
pub mod transcoder;

pub use cli::{Charset, Cli, Mode};
pub use controls::{FocusControls, PathControls, Rgb, ScaleControls, ScaleFactors, Style, StyleControls};
pub use converter::{Cell, FrameRenderer};
pub use decoder::{buffer_image_dir, buffer_image_path, Frame, FrameReceiver, FrameSender};
pub use hue::HueRotator;
pub use limiter::limit;
pub use palette::{stretch, Palette};
pub use region::{FocusSpec, Region};
pub use renderer::{FrameEndHook, PlaybackStats, Player};
pub use scaler::{output_dims, scale_image};
pub use transcoder::{FrameSplitter, Transcoder};

use std::path::PathBuf;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name
pub const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");

/// Error types used throughout the pipeline
#[derive(thiserror::Error, Debug)]
pub enum PhotermError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image decoding error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Transcoder error: {0}")]
    Transcoder(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Stream frame exceeded {limit} bytes without a frame boundary")]
    FrameTooLarge { limit: usize },

    #[error("Frame producer task failed: {0}")]
    Producer(#[from] tokio::task::JoinError),
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, PhotermError>;
