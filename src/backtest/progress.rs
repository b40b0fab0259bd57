//! 節流進度報告
//!
//! 上次發送時間與已報告的最高百分比保存在 [`ProgressClock`] 值中，由每一步
//! 傳入並返回，節流器本身不持有可變狀態，每次運行都可以重新構建。

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::cancel::ProgressSink;
use crate::config::PROGRESS_INTERVAL_SECS;

/// 單調時鐘
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// 系統單調時鐘
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 在各步驟之間傳遞的節流狀態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressClock {
    pub last_emit: Option<Instant>,
    pub high_water: u8,
}

impl ProgressClock {
    pub fn new() -> Self {
        Self::default()
    }
}

/// 進度節流器
#[derive(Clone)]
pub struct ProgressThrottle {
    interval: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ProgressThrottle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressThrottle")
            .field("interval", &self.interval)
            .finish()
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(Duration::from_secs(PROGRESS_INTERVAL_SECS))
    }
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, Arc::new(SystemClock))
    }

    pub fn with_clock(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { interval, clock }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 嘗試發送一次進度，返回新的節流狀態
    ///
    /// `force` 時無條件發送；否則只有距上次發送已過 `interval` 才發送。
    /// 發送的值不低於之前報告過的最高值。
    pub fn emit(
        &self,
        state: ProgressClock,
        percent: u8,
        force: bool,
        sink: Option<&mut ProgressSink<'_>>,
    ) -> ProgressClock {
        let now = self.clock.now();
        let due = match state.last_emit {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if !(force || due) {
            return state;
        }

        let value = percent.min(100).max(state.high_water);
        if let Some(sink) = sink {
            sink(value);
        }

        ProgressClock {
            last_emit: Some(now),
            high_water: value,
        }
    }

    /// 運行開始：強制發送 0
    pub fn start(&self, sink: Option<&mut ProgressSink<'_>>) -> ProgressClock {
        self.emit(ProgressClock::new(), 0, true, sink)
    }

    /// 運行結束：強制發送 100
    pub fn finish(&self, state: ProgressClock, sink: Option<&mut ProgressSink<'_>>) -> ProgressClock {
        self.emit(state, 100, true, sink)
    }
}

/// 已處理步數換算成百分比
pub fn percent_of(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// 手動推進的時鐘
    struct ManualClock {
        base: Instant,
        offset: Mutex<Duration>,
    }

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                base: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
            })
        }

        fn advance(&self, secs: u64) {
            *self.offset.lock() += Duration::from_secs(secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.base + *self.offset.lock()
        }
    }

    #[test]
    fn test_intermediate_emissions_are_throttled() {
        let clock = ManualClock::new();
        let throttle = ProgressThrottle::with_clock(Duration::from_secs(30), clock.clone());
        let mut seen = Vec::new();
        let mut sink = |p: u8| seen.push(p);

        let mut state = throttle.start(Some(&mut sink));
        clock.advance(10);
        state = throttle.emit(state, 20, false, Some(&mut sink));
        clock.advance(25);
        state = throttle.emit(state, 40, false, Some(&mut sink));
        clock.advance(5);
        state = throttle.emit(state, 60, false, Some(&mut sink));
        throttle.finish(state, Some(&mut sink));

        assert_eq!(seen, vec![0, 40, 100]);
    }

    #[test]
    fn test_values_never_regress() {
        let clock = ManualClock::new();
        let throttle = ProgressThrottle::with_clock(Duration::ZERO, clock);
        let mut seen = Vec::new();
        let mut sink = |p: u8| seen.push(p);

        let mut state = throttle.start(Some(&mut sink));
        state = throttle.emit(state, 50, false, Some(&mut sink));
        state = throttle.emit(state, 30, false, Some(&mut sink));
        assert_eq!(state.high_water, 50);
        throttle.finish(state, Some(&mut sink));

        assert_eq!(seen, vec![0, 50, 50, 100]);
    }

    #[test]
    fn test_mock_clock_drives_first_emission() {
        let mut mock = MockClock::new();
        let now = Instant::now();
        mock.expect_now().times(2).return_const(now);
        let throttle = ProgressThrottle::with_clock(Duration::from_secs(30), Arc::new(mock));

        let state = throttle.emit(ProgressClock::new(), 10, false, None);
        assert_eq!(state.last_emit, Some(now));
        // 同一時刻的後續非強制發送被抑制
        let next = throttle.emit(state, 20, false, None);
        assert_eq!(next, state);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(0, 4), 0);
        assert_eq!(percent_of(1, 4), 25);
        assert_eq!(percent_of(5, 4), 100);
        assert_eq!(percent_of(0, 0), 100);
    }
}
