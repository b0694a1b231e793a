// Re-export commonly used types for convenience
pub use crate::cli::{Charset, Cli, Mode};
pub use crate::controls::{
    FocusControls, PathControls, Rgb, ScaleControls, ScaleFactors, Style, StyleControls,
};
pub use crate::converter::{Cell, FrameRenderer};
pub use crate::decoder::{buffer_image_dir, buffer_image_path, frame_buffer, Frame, FrameReceiver};
pub use crate::hue::HueRotator;
pub use crate::limiter::limit;
pub use crate::palette::{stretch, Palette};
pub use crate::region::{FocusSpec, Region};
pub use crate::renderer::{FrameEndHook, Player};
pub use crate::scaler::{output_dims, scale_image};
pub use crate::transcoder::{FrameSplitter, Transcoder};
pub use crate::{PhotermError, Result};

// Re-export external types commonly used in tests
pub use image::{Rgba, RgbaImage};
pub use std::path::Path;
