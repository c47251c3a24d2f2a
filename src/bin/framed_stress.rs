// Stress driver: N producer threads push SHA-256 tagged messages through one
// framed ring while a single consumer verifies every message it reassembles.
//
// Usage: framed_stress <producers> <messages_per_producer> [--auto-exit]
// Log level comes from RUST_LOG (default: info).

use dmxp_framering::MPSC::RingBuilder;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

fn digest_hex(body: &str) -> String {
    format!("{:x}", Sha256::digest(body.as_bytes()))
}

/// `<producer>:<seq>:<padding>|<sha256 of everything before the bar>`
fn make_message(producer: usize, seq: usize) -> String {
    let padding = "x".repeat((producer * 7 + seq) % 40);
    let body = format!("{producer}:{seq}:{padding}");
    let hash = digest_hex(&body);
    format!("{body}|{hash}")
}

fn verify(message: &[u8]) -> Option<(usize, usize)> {
    let text = std::str::from_utf8(message).ok()?;
    let (body, hash) = text.rsplit_once('|')?;
    if digest_hex(body) != hash {
        return None;
    }
    let mut parts = body.splitn(3, ':');
    let producer = parts.next()?.parse().ok()?;
    let seq = parts.next()?.parse().ok()?;
    Some((producer, seq))
}

fn main() -> std::io::Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage: {} <producers> <messages_per_producer> [--auto-exit]",
            args[0]
        );
        std::process::exit(1);
    }
    let producers: usize = args[1].parse().expect("Invalid number of producers");
    let per_producer: usize = args[2].parse().expect("Invalid number of messages");
    let auto_exit = args.get(3).map(|s| s == "--auto-exit").unwrap_or(false);

    let (producer, mut consumer) = RingBuilder::new().with_capacity(64 * 1024).build()?;

    let running = Arc::new(AtomicBool::new(true));
    let running_for_handler = Arc::clone(&running);

    // Handle Ctrl+C to stop early
    ctrlc::set_handler(move || {
        running_for_handler.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    info!(
        producers,
        per_producer,
        frame_size = producer.ring().frame_size(),
        "starting"
    );

    let sent = Arc::new(Mutex::new(vec![0usize; producers]));
    let start = Instant::now();

    let handles: Vec<_> = (0..producers)
        .map(|id| {
            let producer = producer.clone();
            let running = Arc::clone(&running);
            let sent = Arc::clone(&sent);
            thread::spawn(move || {
                for seq in 0..per_producer {
                    let message = make_message(id, seq);
                    loop {
                        if !running.load(Ordering::SeqCst) {
                            return;
                        }
                        match producer.send(&message) {
                            Ok(()) => break,
                            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                                // Ring full, give the consumer time
                                thread::sleep(Duration::from_micros(10));
                            }
                            Err(e) => {
                                error!(id, seq, %e, "send failed");
                                return;
                            }
                        }
                    }
                    sent.lock()[id] += 1;
                }
            })
        })
        .collect();
    drop(producer);

    let mut seen = HashSet::with_capacity(producers * per_producer);
    let mut corrupt = 0usize;
    let expected = producers * per_producer;

    while seen.len() + corrupt < expected && running.load(Ordering::SeqCst) {
        let batch = match consumer.receive_timeout(Duration::from_millis(100)) {
            Ok(batch) => batch,
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => break,
            Err(e) => return Err(e),
        };
        for message in batch {
            match verify(&message) {
                Some(key) => {
                    if !seen.insert(key) {
                        warn!(producer = key.0, seq = key.1, "duplicate message");
                    }
                }
                None => {
                    corrupt += 1;
                    warn!(len = message.len(), "message failed verification");
                }
            }
        }
    }

    for handle in handles {
        if handle.join().is_err() {
            error!("producer thread panicked");
        }
    }

    let elapsed = start.elapsed();
    let total_sent: usize = sent.lock().iter().sum();
    info!(
        sent = total_sent,
        received = seen.len(),
        corrupt,
        ?elapsed,
        rate = %format!("{:.0} msg/s", seen.len() as f64 / elapsed.as_secs_f64()),
        "done"
    );

    if !auto_exit {
        println!("Press Ctrl+C to exit...");
        while running.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(100));
        }
    }

    if corrupt > 0 || seen.len() != total_sent {
        std::process::exit(2);
    }
    Ok(())
}
