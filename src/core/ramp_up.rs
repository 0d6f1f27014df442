use std::time::Duration;

use crate::models::test_config::TestConfiguration;

/// 计算每个虚拟用户的启动偏移
///
/// 只负责算时间，不负责等待；等待由用户会话自己完成。
#[derive(Debug, Clone, Copy)]
pub struct RampUpScheduler {
    virtual_users: usize,
    // 相邻用户的启动间隔(秒)
    interval_secs: f64,
}

impl RampUpScheduler {
    pub fn new(virtual_users: usize, ramp_up_secs: f64) -> Self {
        let interval_secs = ramp_up_secs / virtual_users as f64;
        // 用户数为0或爬坡时间非法时不做错开
        let interval_secs = if interval_secs.is_finite() && interval_secs > 0.0 {
            interval_secs
        } else {
            0.0
        };
        RampUpScheduler {
            virtual_users,
            interval_secs,
        }
    }

    pub fn from_config(config: &TestConfiguration) -> Self {
        RampUpScheduler::new(config.virtual_users, config.ramp_up_secs)
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval_secs
    }

    /// 第`user_id`个用户的启动偏移: user_id * (ramp_up / users)
    pub fn offset(&self, user_id: usize) -> Duration {
        // 超出Duration范围时取最大值，不panic
        Duration::try_from_secs_f64(user_id as f64 * self.interval_secs).unwrap_or(Duration::MAX)
    }

    pub fn offsets(&self) -> Vec<Duration> {
        (0..self.virtual_users).map(|user_id| self.offset(user_id)).collect()
    }
}
