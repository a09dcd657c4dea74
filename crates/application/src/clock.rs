use std::sync::Mutex;

use domain::Timestamp;
use time::Duration;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        time::OffsetDateTime::now_utc()
    }
}

/// 手动推进的时钟，用于需要区分先后顺序的测试。
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }
}

impl Clock for ManualClock {
    /// 每次读取后自动前进一毫秒，保证相邻写入的时间戳严格递增。
    fn now(&self) -> Timestamp {
        match self.current.lock() {
            Ok(mut current) => {
                let now = *current;
                *current += Duration::milliseconds(1);
                now
            }
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
