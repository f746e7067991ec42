//! Per-client sliding-window rate limiting

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);

/// Allows at most `limit` requests per client IP in any 60-second window
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    requests: Mutex<HashMap<IpAddr, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn per_minute(limit: u32) -> Self {
        Self {
            limit: limit as usize,
            window: WINDOW,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `client`; `false` when it exceeds the limit
    pub fn check(&self, client: IpAddr) -> bool {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: IpAddr, now: Instant) -> bool {
        let Ok(mut requests) = self.requests.lock() else {
            tracing::error!("Rate limiter lock poisoned, allowing request");
            return true;
        };

        // Expire old timestamps for every client and forget idle ones
        requests.retain(|_, times| {
            while let Some(oldest) = times.front() {
                if now.saturating_duration_since(*oldest) >= self.window {
                    times.pop_front();
                } else {
                    break;
                }
            }
            !times.is_empty()
        });

        let times = requests.entry(client).or_default();
        if times.len() >= self.limit {
            return false;
        }
        times.push_back(now);
        true
    }
}

#[cfg(test)]
impl RateLimiter {
    fn tracked_clients(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const OTHER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[test]
    fn test_limit_enforced() {
        let limiter = RateLimiter::per_minute(2);
        let now = Instant::now();
        assert!(limiter.check_at(CLIENT, now));
        assert!(limiter.check_at(CLIENT, now));
        assert!(!limiter.check_at(CLIENT, now));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::per_minute(1);
        let now = Instant::now();
        assert!(limiter.check_at(CLIENT, now));
        assert!(limiter.check_at(OTHER, now));
        assert!(!limiter.check_at(CLIENT, now));
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::per_minute(1);
        let start = Instant::now();
        assert!(limiter.check_at(CLIENT, start));
        assert!(!limiter.check_at(CLIENT, start + Duration::from_secs(30)));
        assert!(limiter.check_at(CLIENT, start + Duration::from_secs(61)));
    }

    #[test]
    fn test_idle_clients_are_forgotten() {
        let limiter = RateLimiter::per_minute(5);
        let start = Instant::now();
        assert!(limiter.check_at(CLIENT, start));
        assert!(limiter.check_at(OTHER, start));
        assert_eq!(limiter.tracked_clients(), 2);

        assert!(limiter.check_at(CLIENT, start + Duration::from_secs(61)));
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
