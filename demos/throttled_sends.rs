//! Throttling a message-send loop with the three block modes.
//!
//! Run with: `cargo run --example throttled_sends`

use pacer::{BlockMode, TakeError, TokenBucket, TokenBucketBuilder};
use std::thread;
use std::time::{Duration, Instant};

fn main() {
    println!("=== Throttled Sends ===\n");

    blocking_example("BlockSleep", BlockMode::BlockSleep);

    println!("{}", "\n".to_owned() + "=".repeat(50).as_str() + "\n");

    blocking_example("BlockSpin", BlockMode::BlockSpin);

    println!("{}", "\n".to_owned() + "=".repeat(50).as_str() + "\n");

    non_blocking_example();

    println!("{}", "\n".to_owned() + "=".repeat(50).as_str() + "\n");

    batch_example();
}

fn send_message(_seq: u32) {
    // Stand-in for a real publish call
}

fn blocking_example(name: &str, mode: BlockMode) {
    println!("{}: 50 messages at 20 per 100ms", name);

    let mut bucket = TokenBucketBuilder::new()
        .refill_interval(Duration::from_millis(100))
        .refill_token_amount(20)
        .build();

    let start = Instant::now();
    for seq in 0..50 {
        bucket.take(1, mode).expect("blocking takes do not fail");
        send_message(seq);
    }

    println!("   Sent 50 in {:?} (expected about 200ms)", start.elapsed());
    println!("{}", bucket.metrics());
}

fn non_blocking_example() {
    println!("NonBlocking: send what we can, back off otherwise");

    let mut bucket = TokenBucket::new(100_000_000, 5);
    let mut sent = 0;
    let mut deferred = 0;

    let start = Instant::now();
    while sent < 12 {
        match bucket.take(1, BlockMode::NonBlocking) {
            Ok(()) => {
                send_message(sent);
                sent += 1;
            }
            Err(TakeError::InsufficientTokens { available, .. }) => {
                deferred += 1;
                if deferred % 10 == 1 {
                    println!("   ⏳ {} tokens left, backing off", available);
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(err) => {
                println!("   ⛔ {}", err);
                return;
            }
        }
    }

    println!(
        "   Sent {} in {:?} after {} deferrals",
        sent,
        start.elapsed(),
        deferred
    );
}

fn batch_example() {
    println!("Batches larger than one refill");

    let mut bucket = TokenBucket::new(50_000_000, 10);

    match bucket.take(25, BlockMode::NonBlocking) {
        Err(err) => println!("   NonBlocking batch of 25: {}", err),
        Ok(()) => unreachable!("25 exceeds the capacity of 10"),
    }

    let start = Instant::now();
    bucket
        .take(25, BlockMode::BlockSleep)
        .expect("blocking takes do not fail");
    println!(
        "   Blocking batch of 25 took {:?}, {} tokens left",
        start.elapsed(),
        bucket.current_tokens()
    );
}
