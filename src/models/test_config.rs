use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::error::EngineError;

/// 单个请求的默认超时时间(秒)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// 排行榜默认取前几名
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestConfiguration {
    // 虚拟用户数
    pub virtual_users: usize,
    // 爬坡时间(秒)，用户的启动时间均匀分布在这个窗口里
    pub ramp_up_secs: f64,
    // 单个请求超时
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,
    // 整体截止时间，到点后取消剩余请求
    #[serde(default)]
    pub deadline: Option<Duration>,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

impl TestConfiguration {
    pub fn new(virtual_users: usize, ramp_up_secs: f64) -> Self {
        TestConfiguration {
            virtual_users,
            ramp_up_secs,
            request_timeout: default_request_timeout(),
            deadline: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// 相邻两个用户的启动间隔(秒)，按浮点计算，不取整
    pub fn delay_between_users(&self) -> f64 {
        self.ramp_up_secs / self.virtual_users as f64
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.virtual_users < 1 {
            return Err(EngineError::validation("虚拟用户数必须大于等于1"));
        }
        if !self.ramp_up_secs.is_finite() || self.ramp_up_secs < 1.0 {
            return Err(EngineError::validation(format!(
                "爬坡时间必须是大于等于1的数字: {}",
                self.ramp_up_secs
            )));
        }
        // 最后一个用户的偏移小于爬坡时间，爬坡时间能放进Duration即可
        if Duration::try_from_secs_f64(self.ramp_up_secs).is_err() {
            return Err(EngineError::validation(format!("爬坡时间过大: {}", self.ramp_up_secs)));
        }
        if self.request_timeout.is_zero() {
            return Err(EngineError::validation("请求超时时间必须大于0"));
        }
        if let Some(deadline) = self.deadline {
            if deadline.is_zero() {
                return Err(EngineError::validation("整体截止时间必须大于0"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TestConfiguration::new(10, 5.0);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.deadline.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_delay_is_not_truncated() {
        let config = TestConfiguration::new(4, 1.0);
        assert!((config.delay_between_users() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(TestConfiguration::new(0, 5.0).validate().unwrap_err().is_validation());
        assert!(TestConfiguration::new(1, 0.5).validate().is_err());
        assert!(TestConfiguration::new(1, f64::NAN).validate().is_err());
        assert!(TestConfiguration::new(1, f64::INFINITY).validate().is_err());
        assert!(TestConfiguration::new(2, 1e30).validate().unwrap_err().is_validation());
        assert!(TestConfiguration::new(1, 1.0)
            .with_request_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(TestConfiguration::new(1, 1.0)
            .with_deadline(Duration::ZERO)
            .validate()
            .is_err());
    }
}
