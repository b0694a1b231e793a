use crate::decoder::{frame_buffer, FrameReceiver};
use log::debug;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Throttle a frame buffer to at most `fps` frames per second.
///
/// Every `1/fps` seconds one frame is pulled from `input` and forwarded. Nothing
/// is dropped: a fast producer fills its own bounded buffer and waits there.
/// When `input` closes the limiter stops and closes its output. An `fps` of 0
/// returns `input` untouched.
pub fn limit(input: FrameReceiver, fps: u32) -> FrameReceiver {
    if fps == 0 {
        return input;
    }

    let (tx, rx) = frame_buffer(1);
    // above a billion fps the period rounds down to zero, which interval rejects
    let period = (Duration::from_secs(1) / fps).max(Duration::from_nanos(1));

    tokio::spawn(async move {
        let mut input = input;
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut forwarded = 0u64;
        loop {
            ticker.tick().await;
            let Some(frame) = input.recv().await else {
                break;
            };
            if tx.send(frame).await.is_err() {
                debug!("Frame consumer hung up, stopping fps limiter");
                break;
            }
            forwarded += 1;
        }
        debug!("FPS limiter forwarded {} frames", forwarded);
    });

    rx
}
