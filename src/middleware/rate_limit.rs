//! Rate limiting middleware
//!
//! This module provides per-user rate limiting of roster mutations to
//! prevent abuse of the join/leave endpoints.

use std::num::NonZeroU32;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::models::UserId;
use crate::utils::errors::{SkillHubError, Result};

/// Keyed token-bucket limiter, one bucket per user
pub struct RateLimitMiddleware {
    limiter: DefaultKeyedRateLimiter<UserId>,
}

impl RateLimitMiddleware {
    /// Create a new RateLimitMiddleware instance
    pub fn new(config: &RateLimitConfig) -> Result<Self> {
        let per_minute = NonZeroU32::new(config.per_minute).ok_or_else(|| {
            SkillHubError::Config("Rate limit quota must be greater than 0".to_string())
        })?;
        let burst = NonZeroU32::new(config.burst).unwrap_or(per_minute);

        let quota = Quota::per_minute(per_minute).allow_burst(burst);
        Ok(Self {
            limiter: RateLimiter::keyed(quota),
        })
    }

    /// Check if user is rate limited
    pub fn check_rate_limit(&self, user_id: &UserId) -> Result<()> {
        match self.limiter.check_key(user_id) {
            Ok(()) => {
                debug!(user_id = %user_id, "Rate limit check passed");
                Ok(())
            }
            Err(_) => {
                warn!(user_id = %user_id, "Rate limit exceeded");
                Err(SkillHubError::RateLimitExceeded)
            }
        }
    }

    /// Drop buckets that have fully refilled
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!(tracked_users = self.limiter.len(), "Rate limit buckets cleaned up");
    }

    /// Number of users currently tracked
    pub fn tracked_users(&self) -> usize {
        self.limiter.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(per_minute: u32, burst: u32) -> RateLimitMiddleware {
        RateLimitMiddleware::new(&RateLimitConfig { enabled: true, per_minute, burst }).unwrap()
    }

    #[test]
    fn test_burst_then_limited() {
        let limiter = limiter(60, 3);
        let user = UserId::parse("user-1").unwrap();

        for _ in 0..3 {
            assert!(limiter.check_rate_limit(&user).is_ok());
        }
        assert!(matches!(limiter.check_rate_limit(&user), Err(SkillHubError::RateLimitExceeded)));
    }

    #[test]
    fn test_users_have_separate_buckets() {
        let limiter = limiter(60, 1);
        let alice = UserId::parse("alice").unwrap();
        let bob = UserId::parse("bob").unwrap();

        assert!(limiter.check_rate_limit(&alice).is_ok());
        assert!(limiter.check_rate_limit(&alice).is_err());
        assert!(limiter.check_rate_limit(&bob).is_ok());
        assert_eq!(limiter.tracked_users(), 2);
    }

    #[test]
    fn test_zero_quota_rejected() {
        let config = RateLimitConfig { enabled: true, per_minute: 0, burst: 0 };
        assert!(matches!(RateLimitMiddleware::new(&config), Err(SkillHubError::Config(_))));
    }
}
