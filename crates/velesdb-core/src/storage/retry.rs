//! Retry-with-backoff wrapper for the transient IO operations the storage
//! layer performs directly against the filesystem (fsync, append). A failed
//! syscall here is frequently a momentary resource exhaustion (`EINTR`,
//! `ENOSPC` freed a moment later, an NFS hiccup) rather than a permanent
//! fault, so it's worth a few retries before surfacing the error.

#[cfg(test)]
mod retry_tests;

use crate::error::{Error, Result};
use std::thread;
use std::time::Duration;

const BASE_DELAY: Duration = Duration::from_millis(5);

/// Runs `op`, retrying up to `max_retries` additional times on [`Error::Io`]
/// with exponentially increasing delay between attempts (5ms, 10ms, 20ms, ...).
/// Any other error variant is returned immediately without retrying. The
/// error from the final attempt is the one returned on exhaustion.
pub fn with_io_retry<T>(max_retries: u32, mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(Error::Io(err)) if attempt < max_retries => {
                thread::sleep(BASE_DELAY * 2u32.pow(attempt));
                attempt += 1;
                let _ = err;
            }
            Err(err) => return Err(err),
        }
    }
}
