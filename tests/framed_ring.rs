use dmxp_framering::{FrameConfig, FramedRing, QueueError, RingBuilder};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

fn save_retrying(ring: &FramedRing, message: &[u8]) {
    loop {
        match ring.save(message) {
            Ok(()) => return,
            Err(QueueError::Contention) => std::hint::spin_loop(),
            Err(e) => panic!("save failed: {e}"),
        }
    }
}

#[test]
fn thirty_concurrent_producers() {
    let ring = Arc::new(RingBuilder::new().with_capacity(1000).build_ring().unwrap());
    let inputs: Vec<String> = (0..30).map(|i| format!("testtesttesttesttest{i}")).collect();

    let handles: Vec<_> = inputs
        .iter()
        .cloned()
        .map(|message| {
            let ring = Arc::clone(&ring);
            thread::spawn(move || save_retrying(&ring, message.as_bytes()))
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let got = ring.get().unwrap();
    assert_eq!(got.len(), 30);
    let got: HashSet<String> = got
        .into_iter()
        .map(|m| String::from_utf8(m).unwrap())
        .collect();
    let expected: HashSet<String> = inputs.into_iter().collect();
    assert_eq!(got, expected);
    assert!(ring.is_empty());
}

#[test]
fn multi_fragment_message_reassembles() {
    let ring = FramedRing::new(512, FrameConfig::new(8).unwrap()).unwrap();
    let message: Vec<u8> = (0u8..=60).collect();
    assert_eq!(ring.fragments_for(message.len()), 8);

    ring.save(&message).unwrap();
    assert_eq!(ring.used_len(), 8 * ring.frame_size());
    assert_eq!(ring.get().unwrap(), vec![message]);
}

#[test]
fn single_producer_order_is_kept() {
    let ring = FramedRing::new(400, FrameConfig::new(5).unwrap()).unwrap();
    let messages: Vec<&[u8]> = vec![b"a", b"", b"0123456789abc", b"hello"];
    for m in &messages {
        ring.save(m).unwrap();
    }
    let got = ring.get().unwrap();
    assert_eq!(got, messages.iter().map(|m| m.to_vec()).collect::<Vec<_>>());
}

#[test]
fn over_capacity_is_rejected_without_moving_cursors() {
    let ring = FramedRing::new(100, FrameConfig::default()).unwrap();
    ring.save(b"first").unwrap();
    ring.save(b"second").unwrap();
    ring.save(b"third").unwrap();
    assert_eq!(ring.used_len(), 96);

    assert_eq!(
        ring.save(b"x"),
        Err(QueueError::OutOfCapacity {
            requested: 32,
            available: 4
        })
    );
    assert_eq!(ring.used_len(), 96);
    assert_eq!(ring.get().unwrap().len(), 3);
}

#[test]
fn second_get_returns_nothing() {
    let ring = FramedRing::new(256, FrameConfig::default()).unwrap();
    ring.save(b"only once").unwrap();
    assert_eq!(ring.get().unwrap(), vec![b"only once".to_vec()]);
    assert_eq!(ring.get().unwrap(), Vec::<Vec<u8>>::new());
}

#[test]
fn many_laps_around_a_small_ring() {
    // 100 is not a multiple of the 11-byte frame, so frames straddle the end.
    let ring = FramedRing::new(100, FrameConfig::new(4).unwrap()).unwrap();
    for round in 0..2_000usize {
        let len = fastrand::usize(0..=30);
        let message: Vec<u8> = (0..len).map(|i| (round + i) as u8).collect();
        ring.save(&message).unwrap();
        assert_eq!(ring.get().unwrap(), vec![message], "round {round}");
    }
    assert!(ring.is_empty());
}

#[test]
fn contention_is_reported_not_retried() {
    let ring = Arc::new(FramedRing::new(64 * 1024, FrameConfig::default()).unwrap());
    let threads = 8;
    let attempts = 200;
    let barrier = Arc::new(Barrier::new(threads));
    let saved = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let ring = Arc::clone(&ring);
            let barrier = Arc::clone(&barrier);
            let saved = Arc::clone(&saved);
            thread::spawn(move || {
                barrier.wait();
                let mut contended = 0usize;
                for i in 0..attempts {
                    let message = format!("{t}/{i}");
                    match ring.save(message.as_bytes()) {
                        Ok(()) => saved.lock().push(message),
                        Err(QueueError::Contention) => contended += 1,
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                contended
            })
        })
        .collect();
    let contended: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    let saved = saved.lock().clone();
    assert_eq!(saved.len() + contended, threads * attempts);
    // Every successful save owns exactly one frame.
    assert_eq!(ring.used_len(), saved.len() * ring.frame_size());

    let got: HashSet<Vec<u8>> = ring.get().unwrap().into_iter().collect();
    let expected: HashSet<Vec<u8>> = saved.into_iter().map(String::into_bytes).collect();
    assert_eq!(got, expected);
}

#[test]
fn concurrent_producers_with_live_consumer() {
    let ring = Arc::new(FramedRing::new(2048, FrameConfig::new(16).unwrap()).unwrap());
    let producers = 6;
    let per_producer = 500;

    let handles: Vec<_> = (0..producers)
        .map(|p| {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                for i in 0..per_producer {
                    let pad = "#".repeat(fastrand::usize(0..60));
                    let message = format!("{p}:{i}:{pad}");
                    loop {
                        match ring.save(message.as_bytes()) {
                            Ok(()) => break,
                            Err(QueueError::Contention) | Err(QueueError::OutOfCapacity { .. }) => {
                                thread::yield_now()
                            }
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                }
            })
        })
        .collect();

    let mut seen = HashSet::new();
    let mut last_seq = vec![None::<usize>; producers];
    while seen.len() < producers * per_producer {
        match ring.get() {
            Ok(batch) => {
                for message in batch {
                    let text = String::from_utf8(message).unwrap();
                    let mut parts = text.splitn(3, ':');
                    let p: usize = parts.next().unwrap().parse().unwrap();
                    let i: usize = parts.next().unwrap().parse().unwrap();
                    assert!(parts.next().unwrap().bytes().all(|b| b == b'#'));
                    // One producer's saves are placed in call order.
                    assert!(last_seq[p].map_or(true, |last| i > last));
                    last_seq[p] = Some(i);
                    assert!(seen.insert((p, i)), "duplicate {p}:{i}");
                }
            }
            Err(QueueError::NotReady { .. }) => thread::yield_now(),
            Err(e) => panic!("consumer failed: {e}"),
        }
    }

    for h in handles {
        h.join().unwrap();
    }
    assert!(ring.get().unwrap().is_empty());
}
