//! Shared uniform integer source for every stochastic operator.
//!
//! Raw bytes are drawn in batches from the operating system's CSPRNG and
//! handed out four at a time behind a single lock. A seeded mode fills the
//! same buffer from `fastrand` so that runs can be reproduced.

use std::sync::{Arc, Mutex, OnceLock};
use tracing::error;

/// Bytes fetched per refill (2,500 samples).
pub const BATCH_BYTES: usize = 2500 * 4;

static SHARED: OnceLock<Arc<StrongRandom>> = OnceLock::new();

/// The process-wide OS-backed instance.
pub fn shared() -> Arc<StrongRandom> {
    SHARED
        .get_or_init(|| Arc::new(StrongRandom::new()))
        .clone()
}

enum ByteSource {
    Os,
    Seeded(fastrand::Rng),
}

impl ByteSource {
    fn fill(&mut self, buf: &mut [u8]) {
        match self {
            ByteSource::Os => {
                if let Err(e) = getrandom::fill(buf) {
                    error!("OS random source failed ({}); falling back to fastrand", e);
                    let mut rng = fastrand::Rng::new();
                    rng.fill(buf);
                    *self = ByteSource::Seeded(rng);
                }
            }
            ByteSource::Seeded(rng) => rng.fill(buf),
        }
    }
}

struct Pool {
    source: ByteSource,
    buffer: Box<[u8; BATCH_BYTES]>,
    position: usize,
}

impl Pool {
    fn next_i32(&mut self) -> i32 {
        if self.position + 4 > BATCH_BYTES {
            self.source.fill(&mut self.buffer[..]);
            self.position = 0;
        }

        let p = self.position;
        let bytes = [
            self.buffer[p],
            self.buffer[p + 1],
            self.buffer[p + 2],
            self.buffer[p + 3],
        ];
        self.position += 4;
        i32::from_le_bytes(bytes)
    }
}

pub struct StrongRandom {
    pool: Mutex<Pool>,
}

impl Default for StrongRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl StrongRandom {
    pub fn new() -> Self {
        Self::with_source(ByteSource::Os)
    }

    /// Deterministic variant for reproducible runs. Not cryptographically strong.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_source(ByteSource::Seeded(fastrand::Rng::with_seed(seed)))
    }

    fn with_source(source: ByteSource) -> Self {
        Self {
            pool: Mutex::new(Pool {
                source,
                buffer: Box::new([0u8; BATCH_BYTES]),
                // Start exhausted so the first draw triggers a refill.
                position: BATCH_BYTES,
            }),
        }
    }

    /// Uniform integer in `[min, max)`; `next(k, k) == k`.
    ///
    /// # Panics
    /// Panics if `min > max`.
    pub fn next(&self, min: i32, max: i32) -> i32 {
        assert!(min <= max, "min ({}) is greater than max ({})", min, max);
        if min == max {
            return min;
        }

        let raw = self.next_i32();
        scale(raw, min, max)
    }

    /// Uniform index in `[0, len)`; returns 0 when `len == 0`.
    pub fn next_index(&self, len: usize) -> usize {
        let upper = i32::try_from(len).unwrap_or(i32::MAX);
        self.next(0, upper) as usize
    }

    fn next_i32(&self) -> i32 {
        let mut pool = self.pool.lock().unwrap_or_else(|e| e.into_inner());
        pool.next_i32()
    }
}

/// Maps a raw sample onto `[min, max - 1]` by linear ratio and rounding.
fn scale(raw: i32, min: i32, max: i32) -> i32 {
    let ratio = (raw as f64 - i32::MIN as f64) / (i32::MAX as f64 - i32::MIN as f64);
    let span = (max as f64 - 1.0) - min as f64;
    (min as f64 + (span * ratio).round()) as i32
}
