//! Fixed-interval polling

use log::debug;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::{ClientError, Result};

/// Call `check` every `poll_interval` until it yields a value.
///
/// Errors from `check` end the wait immediately. The deadline is tested
/// before each attempt, so `check` always runs at least once.
pub async fn wait_until<T, F, Fut>(
    what: &str,
    poll_interval: Duration,
    timeout: Duration,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        if attempt > 0 && started.elapsed() > timeout {
            return Err(ClientError::WaitTimeout {
                what: what.to_string(),
                timeout,
            });
        }
        attempt += 1;

        if let Some(value) = check().await? {
            debug!("Done waiting for {} after {} attempt(s)", what, attempt);
            return Ok(value);
        }

        debug!("Still waiting for {} (attempt {})", what, attempt);
        tokio::time::sleep(poll_interval).await;
    }
}
