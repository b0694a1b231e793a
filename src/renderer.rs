use crate::converter::FrameRenderer;
use crate::decoder::FrameReceiver;
use crate::paint::{self, NORMALIZER};
use crate::region::FocusSpec;
use crate::Result;
use crossterm::cursor::{Hide, Show};
use crossterm::queue;
use log::{debug, info};
use std::io::Write;
use std::time::Instant;

/// What happens between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEndHook {
    /// Leave the frame in place and reset styling; for single images
    Still,
    /// Return the cursor to the top of the frame so the next one overwrites it
    Animate,
}

impl FrameEndHook {
    /// Pick the hook for a run from whether more than one frame is expected
    pub fn for_sequence(multiple_frames: bool) -> Self {
        if multiple_frames {
            FrameEndHook::Animate
        } else {
            FrameEndHook::Still
        }
    }

    /// Write the between-frames sequence after a frame of `printed_lines` lines
    pub fn write_after<W: Write>(&self, sink: &mut W, printed_lines: usize) -> std::io::Result<()> {
        match self {
            FrameEndHook::Still => writeln!(sink, "{}", NORMALIZER),
            FrameEndHook::Animate => {
                if printed_lines == 0 {
                    return Ok(());
                }
                write!(sink, "{}", paint::move_cursor_up(printed_lines))
            }
        }
    }
}

/// Playback statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlaybackStats {
    pub frames_rendered: u64,
    pub last_frame_lines: usize,
    pub total_render_time_ms: u64,
}

/// Consumes a frame buffer, rendering each frame to the sink
pub struct Player<W: Write> {
    sink: W,
    renderer: FrameRenderer,
    focus: FocusSpec,
    hook: FrameEndHook,
    stats: PlaybackStats,
    started: bool,
}

impl<W: Write> Player<W> {
    pub fn new(sink: W, renderer: FrameRenderer, focus: FocusSpec, hook: FrameEndHook) -> Self {
        Self {
            sink,
            renderer,
            focus,
            hook,
            stats: PlaybackStats::default(),
            started: false,
        }
    }

    pub fn stats(&self) -> &PlaybackStats {
        &self.stats
    }

    /// Render frames until the buffer closes.
    ///
    /// Each frame is written and flushed whole before the next is taken. The
    /// first error from the producer or the sink ends playback.
    pub async fn play(&mut self, mut frames: FrameReceiver) -> Result<PlaybackStats> {
        while let Some(frame) = frames.recv().await {
            let frame = frame?;
            self.begin()?;

            let start_time = Instant::now();
            let region = self.focus.resolve(frame.width(), frame.height());
            let lines = self.renderer.render(&frame, region);

            self.sink.write_all(lines.join("\n").as_bytes())?;
            self.hook.write_after(&mut self.sink, lines.len())?;
            self.sink.flush()?;

            let render_time = start_time.elapsed().as_millis() as u64;
            self.stats.frames_rendered += 1;
            self.stats.last_frame_lines = lines.len();
            self.stats.total_render_time_ms += render_time;
            debug!(
                "Frame {} rendered in {}ms ({} lines, region {:?})",
                self.stats.frames_rendered,
                render_time,
                lines.len(),
                region
            );
        }

        info!("Playback finished. Total frames: {}", self.stats.frames_rendered);
        Ok(self.stats.clone())
    }

    fn begin(&mut self) -> Result<()> {
        if !self.started {
            self.started = true;
            if self.hook == FrameEndHook::Animate {
                queue!(self.sink, Hide)?;
            }
        }
        Ok(())
    }

    /// Leave the terminal usable: in animation mode the cursor sits at the top
    /// of the last frame, so move it below and show it again.
    pub fn finish(&mut self) -> Result<()> {
        if self.started && self.hook == FrameEndHook::Animate {
            write!(
                self.sink,
                "{}{}",
                paint::move_cursor_down(self.stats.last_frame_lines),
                NORMALIZER
            )?;
            queue!(self.sink, Show)?;
            writeln!(self.sink)?;
        }
        self.started = false;
        self.sink.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
