use std::sync::Mutex;
use std::time::Instant;

use reqwest::Response;
use tokio::time::{sleep, Duration};

/// Tracks GitHub's primary rate limit headers and applies a soft
/// requests-per-minute ceiling on top. The run is strictly sequential, so a
/// plain mutex suffices; `wait` is the only suspension point.
pub struct RateLimiter {
    state: Mutex<RateLimitState>,
}

struct RateLimitState {
    remaining: u32,
    reset_at: Option<Instant>,
    requests_this_minute: u32,
    minute_start: Instant,
}

const SOFT_LIMIT_PER_MINUTE: u32 = 30;

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RateLimitState {
                remaining: 5000,
                reset_at: None,
                requests_this_minute: 0,
                minute_start: Instant::now(),
            }),
        }
    }

    pub async fn wait(&self) {
        let pause = {
            let mut state = self.state.lock().expect("rate limit lock poisoned");
            let now = Instant::now();

            if state.remaining == 0 {
                if let Some(reset_at) = state.reset_at {
                    if reset_at > now {
                        Some(reset_at - now)
                    } else {
                        None
                    }
                } else {
                    None
                }
            } else if state.minute_start.elapsed() >= Duration::from_secs(60) {
                state.requests_this_minute = 0;
                state.minute_start = now;
                None
            } else if state.requests_this_minute >= SOFT_LIMIT_PER_MINUTE {
                Some(Duration::from_secs(60) - state.minute_start.elapsed())
            } else {
                None
            }
        };

        if let Some(duration) = pause {
            tracing::info!("Rate limited, waiting {:?}", duration);
            sleep(duration).await;
            let mut state = self.state.lock().expect("rate limit lock poisoned");
            state.requests_this_minute = 0;
            state.minute_start = Instant::now();
        }

        let mut state = self.state.lock().expect("rate limit lock poisoned");
        state.requests_this_minute += 1;
    }

    pub fn update_from_response(&self, response: &Response) {
        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let Some(remaining) = remaining else {
            return;
        };

        let reset = response
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let mut state = self.state.lock().expect("rate limit lock poisoned");
        state.remaining = remaining;
        if let Some(reset_timestamp) = reset {
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            if reset_timestamp > now {
                state.reset_at =
                    Some(Instant::now() + Duration::from_secs(reset_timestamp - now));
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
