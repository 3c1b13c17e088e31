//! Connection retry policy: up to 3 attempts with a fixed delay.
//! Connecting is the only operation that auto-retries.

use docqa_core::error::{Error, Result};
use std::future::Future;
use std::time::Duration;

pub const CONNECT_ATTEMPTS: u32 = 3;
pub const CONNECT_DELAY: Duration = Duration::from_secs(2);

pub async fn connect_with_retry<T, E, F, Fut>(
    attempts: u32,
    delay: Duration,
    mut connect: F,
) -> Result<T>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    debug_assert!(attempts > 0);
    let mut last_error = String::new();
    for attempt in 1..=attempts {
        match connect().await {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                last_error = e.to_string();
                tracing::warn!(attempt, attempts, error = %last_error, "index connection failed");
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    Err(Error::Connection { attempts, message: last_error })
}
