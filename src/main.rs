use photerm::prelude::*;
use photerm::PlaybackStats;

use anyhow::Context;
use clap::Parser;
use log::{debug, error, info, LevelFilter};
use std::io::{self, BufWriter, ErrorKind};

/// Pick the frame source for the requested mode
async fn open_frames(cli: &Cli) -> Result<FrameReceiver> {
    let factors = cli.scale_factors();
    match cli.mode {
        Mode::Image => buffer_image_path(cli, factors),
        Mode::Dir => buffer_image_dir(input_path(cli)?, factors),
        Mode::Stream => Transcoder::new(&cli.transcoder).stream(input_path(cli)?, factors),
        Mode::Batch => {
            let frames_dir = Transcoder::new(&cli.transcoder)
                .extract_frames(input_path(cli)?)
                .await?;
            buffer_image_dir(&frames_dir, factors)
        }
    }
}

fn input_path(cli: &Cli) -> Result<&Path> {
    cli.path()
        .ok_or_else(|| PhotermError::InvalidConfig("no input path given".to_string()))
}

fn is_broken_pipe(err: &PhotermError) -> bool {
    matches!(err, PhotermError::Io(e) if e.kind() == ErrorKind::BrokenPipe)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .init();

    // Validate CLI arguments
    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    debug!("Starting {} v{}", photerm::PACKAGE_NAME, photerm::VERSION);

    if cli.dump_args {
        cli.dump_args().context("Failed to dump arguments")?;
    }

    let palette = Palette::from_glyphs(cli.glyphs())?;
    let renderer = FrameRenderer::new(palette, cli.style());
    let hook = FrameEndHook::for_sequence(cli.mode.is_animated());

    let frames = open_frames(&cli).await?;
    let frames = if cli.mode.is_animated() {
        limit(frames, cli.fps)
    } else {
        frames
    };

    let stdout = io::stdout();
    let mut player = Player::new(BufWriter::new(stdout.lock()), renderer, cli.focus(), hook);

    let outcome: Option<Result<PlaybackStats>> = tokio::select! {
        result = player.play(frames) => Some(result),
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C pressed, exiting");
            None
        }
    };

    // Restore the cursor even when playback failed part way
    let finished = player.finish();

    match outcome {
        Some(Ok(stats)) => {
            debug!(
                "Rendered {} frames in {}ms",
                stats.frames_rendered, stats.total_render_time_ms
            );
        }
        Some(Err(e)) if is_broken_pipe(&e) => {
            debug!("Output closed, stopping");
            return Ok(());
        }
        Some(Err(e)) => return Err(e.into()),
        None => {}
    }

    match finished {
        Err(e) if is_broken_pipe(&e) => Ok(()),
        other => Ok(other?),
    }
}
