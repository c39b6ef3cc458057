//! 재시도 정책
//!
//! 최초 시도 이후 최대 `max_retries`번 다시 시도하며,
//! 시도 사이의 지연은 [`Backoff`]에 따라 결정됩니다.

use std::str::FromStr;
use std::time::Duration;

use pagerpost_core::config::PagerDutyConfig;

use crate::error::PagerDutyError;

/// 재시도 간격 증가 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backoff {
    /// 매번 같은 지연
    #[default]
    Fixed,
    /// 시도마다 지연을 두 배로
    Exponential,
}

impl FromStr for Backoff {
    type Err = PagerDutyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Self::Fixed),
            "exponential" => Ok(Self::Exponential),
            other => Err(PagerDutyError::Config {
                field: "pagerduty.retry_backoff".to_owned(),
                reason: format!("unknown backoff '{other}'"),
            }),
        }
    }
}

/// 인시던트 전송 재시도 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최초 시도 이후 재시도 횟수
    pub max_retries: u32,
    /// 기본 지연
    pub delay: Duration,
    /// 지연 증가 방식
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// 재시도 1회, 1초 고정 지연
    pub const fn conservative() -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_secs(1),
            backoff: Backoff::Fixed,
        }
    }

    /// 재시도하지 않는 정책
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
            backoff: Backoff::Fixed,
        }
    }

    /// `[pagerduty]` 설정 섹션에서 정책을 만듭니다.
    pub fn from_config(config: &PagerDutyConfig) -> Result<Self, PagerDutyError> {
        Ok(Self {
            max_retries: config.max_retries,
            delay: Duration::from_millis(config.retry_delay_ms),
            backoff: config.retry_backoff.parse()?,
        })
    }

    /// `attempt`번째 재시도 전에 기다릴 시간 (1부터 시작, 0은 최초 시도)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => {
                let factor = 2_u32.saturating_pow(attempt - 1);
                self.delay.saturating_mul(factor)
            }
        }
    }

    /// 최대 시도 횟수 (최초 시도 포함)
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::conservative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conservative_is_one_retry_after_one_second() {
        let policy = RetryPolicy::conservative();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.max_attempts(), 2);
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn first_attempt_has_no_delay() {
        assert_eq!(RetryPolicy::conservative().delay_for(0), Duration::ZERO);
    }

    #[test]
    fn fixed_backoff_keeps_delay() {
        let policy = RetryPolicy {
            max_retries: 3,
            delay: Duration::from_millis(250),
            backoff: Backoff::Fixed,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for(3), Duration::from_millis(250));
    }

    #[test]
    fn exponential_backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 4,
            delay: Duration::from_millis(100),
            backoff: Backoff::Exponential,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(4), Duration::from_millis(800));
    }

    #[test]
    fn exponential_backoff_saturates() {
        let policy = RetryPolicy {
            max_retries: u32::MAX,
            delay: Duration::from_secs(1),
            backoff: Backoff::Exponential,
        };
        assert_eq!(
            policy.delay_for(200),
            Duration::from_secs(u64::from(u32::MAX))
        );
        assert_eq!(policy.max_attempts(), u32::MAX);
    }

    #[test]
    fn from_config_reads_pagerduty_section() {
        let config = PagerDutyConfig {
            max_retries: 2,
            retry_delay_ms: 50,
            retry_backoff: "exponential".to_owned(),
            ..PagerDutyConfig::default()
        };
        let policy = RetryPolicy::from_config(&config).unwrap();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.delay, Duration::from_millis(50));
        assert_eq!(policy.backoff, Backoff::Exponential);
    }

    #[test]
    fn default_config_yields_conservative_policy() {
        let policy = RetryPolicy::from_config(&PagerDutyConfig::default()).unwrap();
        assert_eq!(policy, RetryPolicy::conservative());
    }

    #[test]
    fn unknown_backoff_is_config_error() {
        let err = "linear".parse::<Backoff>().unwrap_err();
        assert!(matches!(err, PagerDutyError::Config { .. }));
    }
}
