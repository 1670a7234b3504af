//! Integration tests: rate-limit cache atomicity and TTL expiry.

use std::sync::Barrier;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pondwatch::adapters::memory::MemoryRateLimitCache;
use pondwatch::adapters::time::{ManualClock, SystemClock};
use pondwatch::app::ports::RateLimitCache;

const TTL: Duration = Duration::from_secs(60);

#[test]
fn concurrent_claims_have_exactly_one_winner() {
    const THREADS: usize = 16;
    let cache = MemoryRateLimitCache::new(SystemClock::new());
    let barrier = Barrier::new(THREADS);
    let winners = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                barrier.wait();
                if cache.try_set_if_absent("quality:Poor", TTL).unwrap() {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(winners.load(Ordering::SeqCst), 1);
}

#[test]
fn keys_are_independent() {
    let clock = ManualClock::new(0);
    let cache = MemoryRateLimitCache::new(&clock);
    assert!(cache.try_set_if_absent("quality:Poor", TTL).unwrap());
    assert!(cache.try_set_if_absent("params:ph", TTL).unwrap());
    assert!(!cache.try_set_if_absent("quality:Poor", TTL).unwrap());
}

#[test]
fn entry_expires_after_ttl() {
    let clock = ManualClock::new(1_000);
    let cache = MemoryRateLimitCache::new(&clock);

    assert!(cache.try_set_if_absent("params:tds", TTL).unwrap());
    clock.advance(Duration::from_secs(59));
    assert!(!cache.try_set_if_absent("params:tds", TTL).unwrap());
    clock.advance(Duration::from_secs(1));
    assert!(cache.try_set_if_absent("params:tds", TTL).unwrap());
}

#[test]
fn purge_drops_only_expired_entries() {
    let clock = ManualClock::new(0);
    let cache = MemoryRateLimitCache::new(&clock);
    cache.try_set_if_absent("short", Duration::from_secs(1)).unwrap();
    cache.try_set_if_absent("long", TTL).unwrap();

    clock.advance(Duration::from_secs(2));
    assert_eq!(cache.purge_expired(), 1);
    assert!(!cache.try_set_if_absent("long", TTL).unwrap());
}
