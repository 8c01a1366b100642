//! Demo producer: pushes synthetic encoded frames at a fixed rate.
//!
//! Stands in for the camera + JPEG encoder side; each payload is a
//! pattern-filled buffer sized like a compressed frame.

use std::{
    thread,
    time::{Duration, Instant},
};

use framelink::{SenderBuilder, SocketState, TransmitError};

const TARGET_ADDR: &str = "127.0.0.1:5000";
const CHUNK_SIZE: usize = 1400;
const SEND_BUF_SIZE: usize = 65536;
const FRAME_RATE: u32 = 30;
const FRAME_BYTES: usize = 24 * 1024;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| TARGET_ADDR.to_string());
    let target = target.parse().expect("bad target address");

    let mut sender = SenderBuilder {
        target,
        chunk_size: CHUNK_SIZE,
        snd_buf_size: Some(SEND_BUF_SIZE),
        rebind_backoff: Duration::from_secs(2),
    }
    .build();

    let interval = Duration::from_secs(1) / FRAME_RATE;
    let mut frame_no: u64 = 0;
    log::info!("streaming {} byte frames to {}", FRAME_BYTES, target);

    loop {
        let started = Instant::now();
        let payload = synthetic_frame(frame_no);
        match sender.transmit(&payload) {
            Ok(()) => {}
            Err(TransmitError::Bind(e)) => {
                log::warn!("socket unavailable ({}), pausing production", e);
            }
            Err(e) => log::warn!("frame {} dropped: {}", frame_no, e),
        }
        if sender.socket_state() == SocketState::Unbound {
            thread::sleep(Duration::from_millis(500));
        }
        frame_no += 1;

        let elapsed = started.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}

fn synthetic_frame(frame_no: u64) -> Vec<u8> {
    let mut payload = Vec::with_capacity(FRAME_BYTES);
    for i in 0..FRAME_BYTES {
        payload.push((frame_no as usize + i) as u8);
    }
    payload
}
