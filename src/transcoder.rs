//! Video input through an external transcoder (ffmpeg by default).
//!
//! Batch mode writes numbered stills next to the video and plays them back as a
//! directory. Streaming mode reads a concatenated PNG stream from the
//! transcoder's stdout and cuts it into frames at each PNG signature.

use crate::controls::ScaleFactors;
use crate::decoder::{decode_and_scale, frame_buffer, FrameReceiver, FrameSender};
use crate::{PhotermError, Result};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{ChildStderr, Command};
use tokio::task::JoinHandle;

/// Signature that opens every PNG frame in the stream
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

/// Frame rate the transcoder samples the video at
pub const TRANSCODE_FPS: u32 = 24;

/// Naming pattern for batch-extracted stills
pub const FRAME_NAME_PATTERN: &str = "%05d.jpg";

/// Largest frame the splitter will accumulate before giving up
pub const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Frames decoded ahead of the consumer in streaming mode
pub const STREAM_BUFFER_FRAMES: usize = 8;

const READ_CHUNK: usize = 4096;
const LOG_TAIL_LINES: usize = 20;

/// Cuts a byte stream of back-to-back images into one buffer per image.
///
/// The stream is expected to start with the header. A header found at any
/// later offset closes the frame before it; the new header starts the next
/// frame. Bytes still held when the stream ends are the last frame.
#[derive(Debug)]
pub struct FrameSplitter {
    header: Vec<u8>,
    buffer: Vec<u8>,
    scan_from: usize,
    max_frame_bytes: usize,
}

impl FrameSplitter {
    pub fn new(header: &[u8], max_frame_bytes: usize) -> Self {
        Self {
            header: header.to_vec(),
            buffer: Vec::new(),
            scan_from: header.len(),
            max_frame_bytes,
        }
    }

    pub fn png() -> Self {
        Self::new(&PNG_SIGNATURE, MAX_FRAME_BYTES)
    }

    /// Feed a chunk of the stream and return every frame it completed
    pub fn cut_frames(&mut self, chunk: &[u8]) -> Result<Vec<Vec<u8>>> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(offset) = self.find_next_header() {
            let rest = self.buffer.split_off(offset);
            frames.push(std::mem::replace(&mut self.buffer, rest));
            self.scan_from = self.header.len();
        }

        if self.buffer.len() > self.max_frame_bytes {
            return Err(PhotermError::FrameTooLarge {
                limit: self.max_frame_bytes,
            });
        }
        Ok(frames)
    }

    /// End of stream: hand back whatever is left as the final frame
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        self.scan_from = self.header.len();
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    fn find_next_header(&mut self) -> Option<usize> {
        let needle = self.header.len();
        if needle == 0 || self.buffer.len() < self.scan_from + needle {
            return None;
        }

        let found = self.buffer[self.scan_from..]
            .windows(needle)
            .position(|window| window == self.header.as_slice())
            .map(|pos| pos + self.scan_from);

        if found.is_none() {
            // a header may still straddle the end of the buffer
            self.scan_from = self.buffer.len() + 1 - needle;
        }
        found
    }
}

/// Read an image stream, cut it into frames, and decode and scale each one in order.
///
/// Returns `Ok(false)` if the consumer hung up before the stream ended.
async fn pump_frames<R>(mut reader: R, factors: ScaleFactors, tx: &FrameSender) -> Result<bool>
where
    R: AsyncRead + Unpin,
{
    let mut splitter = FrameSplitter::png();
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut sent = 0u64;

    loop {
        let n = reader.read(&mut chunk).await?;
        let frames: Vec<Vec<u8>> = if n == 0 {
            splitter.finish().into_iter().collect()
        } else {
            splitter.cut_frames(&chunk[..n])?
        };

        for bytes in frames {
            let frame = tokio::task::spawn_blocking(move || decode_and_scale(&bytes, factors)).await??;
            if tx.send(Ok(frame)).await.is_err() {
                debug!("Frame consumer hung up after {} stream frames", sent);
                return Ok(false);
            }
            sent += 1;
        }

        if n == 0 {
            debug!("Stream ended after {} frames", sent);
            return Ok(true);
        }
    }
}

/// Decode a concatenated PNG stream from any async reader into a frame buffer
pub fn frames_from_reader<R>(reader: R, factors: ScaleFactors) -> FrameReceiver
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = frame_buffer(STREAM_BUFFER_FRAMES);
    tokio::spawn(async move {
        if let Err(e) = pump_frames(reader, factors, &tx).await {
            let _ = tx.send(Err(e)).await;
        }
    });
    rx
}

/// Split raw transcoder output into log lines. Progress updates end in `\r`
/// rather than `\n`, so both count as line ends. Bytes that are not UTF-8 are
/// replaced rather than rejected.
fn log_lines(raw: &[u8]) -> impl Iterator<Item = String> + '_ {
    raw.split(|&b| b == b'\n' || b == b'\r')
        .filter(|line| !line.is_empty())
        .map(|line| String::from_utf8_lossy(line).into_owned())
}

/// Forward transcoder diagnostics to the log, keeping the last lines for error reports.
/// Only a failed read is sent down the frame buffer as fatal.
fn drain_stderr(stderr: ChildStderr, tx: FrameSender) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let mut tail = VecDeque::with_capacity(LOG_TAIL_LINES);
        let mut reader = BufReader::new(stderr);
        let mut raw = Vec::new();
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw).await {
                Ok(0) => break,
                Ok(_) => {
                    for line in log_lines(&raw) {
                        debug!("transcoder: {}", line);
                        if tail.len() == LOG_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                }
                Err(e) => {
                    warn!("Failed reading transcoder stderr: {}", e);
                    let _ = tx.send(Err(e.into())).await;
                    break;
                }
            }
        }
        Vec::from(tail)
    })
}

/// Handle on the external transcoder program
#[derive(Debug, Clone)]
pub struct Transcoder {
    program: String,
}

impl Transcoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments that stream PNG frames to stdout
    pub fn stream_args(input: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.display().to_string(),
            "-vf".to_string(),
            format!("fps={}", TRANSCODE_FPS),
            "-vcodec".to_string(),
            "png".to_string(),
            "-f".to_string(),
            "image2pipe".to_string(),
            "-".to_string(),
        ]
    }

    /// Arguments that write numbered stills into `out_dir`, replacing stills
    /// left by an earlier run
    pub fn batch_args(input: &Path, out_dir: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-vf".to_string(),
            format!("fps={}", TRANSCODE_FPS),
            out_dir.join(FRAME_NAME_PATTERN).display().to_string(),
        ]
    }

    /// Directory batch stills are written to: the one holding the video
    pub fn frames_dir(input: &Path) -> PathBuf {
        match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Extract stills from `input` into its own directory and return that directory
    pub async fn extract_frames(&self, input: &Path) -> Result<PathBuf> {
        let out_dir = Self::frames_dir(input);
        info!("Extracting frames of {} into {}", input.display(), out_dir.display());

        let output = Command::new(&self.program)
            .args(Self::batch_args(input, &out_dir))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let log = String::from_utf8_lossy(&output.stderr);
            return Err(PhotermError::Transcoder(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                tail(&log)
            )));
        }

        Ok(out_dir)
    }

    /// Spawn the transcoder and stream its frames into a frame buffer.
    ///
    /// The child is killed if the buffer's consumer goes away. A non-zero exit
    /// is reported as an error after the last frame.
    pub fn stream(&self, input: &Path, factors: ScaleFactors) -> Result<FrameReceiver> {
        let mut child = Command::new(&self.program)
            .args(Self::stream_args(input))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;
        info!("Streaming {} through {}", input.display(), self.program);

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PhotermError::Transcoder("failed to capture transcoder stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| PhotermError::Transcoder("failed to capture transcoder stderr".into()))?;

        let (tx, rx) = frame_buffer(STREAM_BUFFER_FRAMES);
        let logs = drain_stderr(stderr, tx.clone());
        let program = self.program.clone();

        tokio::spawn(async move {
            match pump_frames(stdout, factors, &tx).await {
                Ok(true) => {}
                Ok(false) => return,
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            }

            let outcome = match child.wait().await {
                Ok(status) if status.success() => {
                    debug!("{} exited cleanly", program);
                    return;
                }
                Ok(status) => {
                    let log = logs.await.unwrap_or_default().join("\n");
                    PhotermError::Transcoder(format!("{} exited with {}: {}", program, status, log))
                }
                Err(e) => PhotermError::Io(e),
            };
            let _ = tx.send(Err(outcome)).await;
        });

        Ok(rx)
    }

    fn spawn_error(&self, e: std::io::Error) -> PhotermError {
        PhotermError::Transcoder(format!("failed to run {}: {}", self.program, e))
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

fn tail(log: &str) -> String {
    let lines: Vec<&str> = log.lines().collect();
    lines[lines.len().saturating_sub(LOG_TAIL_LINES)..].join("\n")
}
