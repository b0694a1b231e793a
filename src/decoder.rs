use crate::controls::{PathControls, ScaleFactors};
use crate::scaler::scale_image;
use crate::{PhotermError, Result};
use image::{DynamicImage, RgbaImage};
use log::{debug, info, warn};
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// A decoded, scaled frame ready for rendering
pub type Frame = RgbaImage;

/// Write side of a frame buffer. A producer that fails sends its error as the last item.
pub type FrameSender = mpsc::Sender<Result<Frame>>;

/// Read side of a frame buffer. `None` from `recv` is the end of playback.
pub type FrameReceiver = mpsc::Receiver<Result<Frame>>;

/// File extensions a directory source treats as frames
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Create a bounded frame buffer (a zero capacity is raised to one)
pub fn frame_buffer(capacity: usize) -> (FrameSender, FrameReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Decode an image file, sniffing the format from its content
pub fn decode_path(path: &Path) -> Result<DynamicImage> {
    let reader = image::io::Reader::open(path).map_err(|source| PhotermError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let image = reader.with_guessed_format()?.decode()?;
    debug!("Decoded {} ({}x{})", path.display(), image.width(), image.height());
    Ok(image)
}

/// Decode an in-memory encoded image
pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

pub(crate) fn decode_and_scale(bytes: &[u8], factors: ScaleFactors) -> Result<Frame> {
    decode_bytes(bytes).map(|image| scale_image(&image, factors))
}

enum ImageInput {
    Stdin,
    File(PathBuf),
}

impl ImageInput {
    fn decode(&self) -> Result<DynamicImage> {
        match self {
            ImageInput::Stdin => {
                let mut bytes = Vec::new();
                std::io::stdin().lock().read_to_end(&mut bytes)?;
                debug!("Read {} bytes from stdin", bytes.len());
                decode_bytes(&bytes)
            }
            ImageInput::File(path) => decode_path(path),
        }
    }
}

/// Buffer a single image, from its path or from stdin, for still display
pub fn buffer_image_path<P: PathControls>(spec: &P, factors: ScaleFactors) -> Result<FrameReceiver> {
    let input = match (spec.reads_stdin(), spec.path()) {
        (true, _) => ImageInput::Stdin,
        (false, Some(path)) => ImageInput::File(path.to_path_buf()),
        (false, None) => {
            return Err(PhotermError::InvalidConfig("no image path given".to_string()));
        }
    };

    let (tx, rx) = frame_buffer(1);
    tokio::task::spawn_blocking(move || {
        let frame = input.decode().map(|image| scale_image(&image, factors));
        // the consumer may already be gone; nothing left to do either way
        let _ = tx.blocking_send(frame);
    });

    Ok(rx)
}

/// List the frame files of a directory, sorted by name
pub fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| PhotermError::Open {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        if is_image_file(&path) {
            files.push(path);
        } else {
            debug!("Skipping non-frame entry {}", path.display());
        }
    }

    files.sort();
    Ok(files)
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Decode every frame file in `dir` on a producer task.
///
/// The buffer holds one slot per eligible file. The first open or decode error
/// is sent down the buffer and ends production.
pub fn buffer_image_dir(dir: &Path, factors: ScaleFactors) -> Result<FrameReceiver> {
    let files = list_image_files(dir)?;
    if files.is_empty() {
        warn!("No frame files found in {}", dir.display());
    }
    info!("Buffering {} frames from {}", files.len(), dir.display());

    let (tx, rx) = frame_buffer(files.len());
    tokio::task::spawn_blocking(move || {
        for path in files {
            let frame = decode_path(&path).map(|image| scale_image(&image, factors));
            let failed = frame.is_err();
            if tx.blocking_send(frame).is_err() {
                debug!("Frame consumer hung up, stopping directory producer");
                return;
            }
            if failed {
                return;
            }
        }
        debug!("Directory producer finished");
    });

    Ok(rx)
}
