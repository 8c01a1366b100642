//! Demo consumer: polls for completed frames and prints a rate line.
//!
//! Stands in for the display + JPEG decoder side; the validity hook here
//! only checks the first byte of the synthetic pattern, where a real
//! application would attempt an image decode.

use std::time::{Duration, Instant};

use framelink::{FrameValidator, ReceiverBuilder, SocketState};

const BIND_ADDR: &str = "0.0.0.0:5000";
const RECV_BUF_SIZE: usize = 262144;
const POLL_TIMEOUT: Duration = Duration::from_millis(500);

struct NonEmpty;

impl FrameValidator for NonEmpty {
    fn validate(&self, payload: &[u8]) -> bool {
        !payload.is_empty()
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let bind_addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| BIND_ADDR.to_string());
    let bind_addr = bind_addr.parse().expect("bad bind address");

    let mut builder = ReceiverBuilder::new(bind_addr);
    builder.rcv_buf_size = Some(RECV_BUF_SIZE);
    builder.validator = Some(Box::new(NonEmpty));
    let mut receiver = builder.build();

    match receiver.bind() {
        Ok(addr) => log::info!("listening on {}", addr),
        Err(e) => log::warn!("initial bind failed: {}", e),
    }

    let mut frames: u64 = 0;
    let mut bytes: u64 = 0;
    let mut window_start = Instant::now();

    loop {
        match receiver.poll(POLL_TIMEOUT) {
            Ok(Some(payload)) => {
                frames += 1;
                bytes += payload.len() as u64;
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("poll failed: {}", e);
                if receiver.socket_state() == SocketState::Unbound {
                    std::thread::sleep(Duration::from_millis(500));
                }
            }
        }

        let elapsed = window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            let fps = frames as f64 / elapsed.as_secs_f64();
            log::info!(
                "{:.1} fps, {:.1} KiB/s, {} pending buffers",
                fps,
                bytes as f64 / 1024.0 / elapsed.as_secs_f64(),
                receiver.pending_buffers()
            );
            frames = 0;
            bytes = 0;
            window_start = Instant::now();
        }
    }
}
