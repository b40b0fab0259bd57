//! 運行狀態與作用域釋放
//!
//! 快照引用與價格、基本面快取只在一次 `run_backtest` 期間綁定。
//! [`RunStateGuard`] 在任何退出路徑（完成、提前終止、取消、錯誤）上解除綁定。

use std::fmt;
use std::ops::{Deref, DerefMut};

use chrono::NaiveDate;
use tracing::debug;

use crate::data_provider::{FundamentalTable, PitDataView, PitViolationError, PriceTable};
use crate::snapshot::Snapshot;

/// 評估循環的階段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    NotStarted,
    Locked,
    Iterating(NaiveDate),
    Completed,
    Cancelled,
    HaltedEarly,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::NotStarted => write!(f, "not_started"),
            RunPhase::Locked => write!(f, "locked"),
            RunPhase::Iterating(date) => write!(f, "iterating({})", date),
            RunPhase::Completed => write!(f, "completed"),
            RunPhase::Cancelled => write!(f, "cancelled"),
            RunPhase::HaltedEarly => write!(f, "halted_early"),
            RunPhase::Failed => write!(f, "failed"),
        }
    }
}

/// 引擎獨佔的快照與快取
#[derive(Debug, Default)]
pub struct RunState {
    snapshot: Option<Snapshot>,
    prices: Option<PriceTable>,
    fundamentals: Option<FundamentalTable>,
    phase: RunPhase,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 綁定快照與已按邊界截斷的數據
    pub fn bind(
        &mut self,
        snapshot: Snapshot,
        prices: PriceTable,
        fundamentals: Option<FundamentalTable>,
    ) {
        self.snapshot = Some(snapshot);
        self.prices = Some(prices);
        self.fundamentals = fundamentals;
        self.phase = RunPhase::Locked;
    }

    /// 解除綁定；重複調用無副作用。保留最後的階段供查詢
    pub fn release(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            debug!(snapshot_id = %snapshot.snapshot_id, "釋放快照與快取視圖");
        }
        self.prices = None;
        self.fundamentals = None;
    }

    pub fn is_locked(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn prices(&self) -> Result<&PriceTable, PitViolationError> {
        self.prices.as_ref().ok_or(PitViolationError::NoSnapshotLocked)
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: RunPhase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "運行階段轉換");
        }
        self.phase = phase;
    }

    /// 當前快照的時點視圖；未鎖定時返回 `NoSnapshotLocked`
    pub fn view(&self, filing_lag_days: i64) -> Result<PitDataView<'_>, PitViolationError> {
        let prices = self.prices()?;
        Ok(PitDataView::new(
            prices,
            self.fundamentals.as_ref(),
            filing_lag_days,
        ))
    }
}

/// 作用域守衛：離開作用域時釋放運行狀態
pub struct RunStateGuard<'a> {
    state: &'a mut RunState,
}

impl<'a> RunStateGuard<'a> {
    pub fn new(state: &'a mut RunState) -> Self {
        Self { state }
    }
}

impl Deref for RunStateGuard<'_> {
    type Target = RunState;

    fn deref(&self) -> &RunState {
        self.state
    }
}

impl DerefMut for RunStateGuard<'_> {
    fn deref_mut(&mut self) -> &mut RunState {
        self.state
    }
}

impl Drop for RunStateGuard<'_> {
    fn drop(&mut self) {
        self.state.release();
    }
}
