use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

use crate::types::ObjectId;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Generates ObjectIds: 4-byte seconds timestamp, 5 process-unique bytes,
/// 3-byte wrapping counter.
///
/// Each store owns its generator; there is no process-wide instance.
#[derive(Debug)]
pub struct ObjectIdGenerator {
    process_unique: [u8; 5],
    counter: AtomicU32,
}

impl ObjectIdGenerator {
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        let pid = std::process::id().to_be_bytes();

        Self {
            process_unique: [pid[0], pid[1], pid[2], pid[3], (nanos & 0xFF) as u8],
            counter: AtomicU32::new((nanos >> 8) & COUNTER_MASK),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_state(process_unique: [u8; 5], counter: u32) -> Self {
        Self {
            process_unique,
            counter: AtomicU32::new(counter & COUNTER_MASK),
        }
    }

    pub fn next_id(&self, at: DateTime<Utc>) -> ObjectId {
        let secs = (at.timestamp().max(0) as u32).to_be_bytes();
        let count = (self.counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK).to_be_bytes();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs);
        bytes[4..9].copy_from_slice(&self.process_unique);
        bytes[9..].copy_from_slice(&count[1..]);
        ObjectId::from_bytes(bytes)
    }
}

impl Default for ObjectIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
