//! 時點回測引擎
//!
//! 一次 `run_backtest` 的流程：輪詢取消 → 鎖定快照並加載有界數據 →
//! 按升序逐日計算信號、遠期收益並累積 → 匯總結果。
//! 引擎是單線程、協作式的；同一實例不支持重疊運行，需要並發時請使用多個實例。

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::accumulator::RunAccumulator;
use super::alpha::AlphaStrategy;
use super::cancel::RunHooks;
use super::error::BacktestError;
use super::forward_return::{forward_returns, ForwardReturnError};
use super::progress::{percent_of, Clock, ProgressThrottle};
use super::results::{aggregate, BacktestResult, RunContext, RunTermination};
use super::state::{RunPhase, RunState, RunStateGuard};
use crate::config::{EngineConfig, Validator};
use crate::data_provider::{FundamentalTable, PitViolationError, PriceTable, RawDataProvider};
use crate::domain_types::{DatasetKind, FundamentalRecord, ForwardReturn, PriceRecord, WeightMethod};
use crate::monitor::{BacktestMetrics, RunOutcome};
use crate::snapshot::{Snapshot, SnapshotService};

/// 回測請求
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weight_method: WeightMethod,
    /// 衰減曲線的期限；為空時不計算衰減
    pub decay_horizons: Vec<usize>,
    /// 主期限，缺省時使用配置的 `default_horizon`
    pub horizon: Option<usize>,
    /// 重用既有快照
    pub snapshot_id: Option<String>,
}

impl BacktestRequest {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            weight_method: WeightMethod::default(),
            decay_horizons: Vec::new(),
            horizon: None,
            snapshot_id: None,
        }
    }

    pub fn with_weight_method(mut self, method: WeightMethod) -> Self {
        self.weight_method = method;
        self
    }

    pub fn with_decay_horizons(mut self, horizons: Vec<usize>) -> Self {
        self.decay_horizons = horizons;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn with_snapshot(mut self, snapshot_id: impl Into<String>) -> Self {
        self.snapshot_id = Some(snapshot_id.into());
        self
    }

    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.start_date > self.end_date {
            return Err(BacktestError::InvalidRequest(format!(
                "start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }
        if self.horizon == Some(0) {
            return Err(BacktestError::InvalidRequest(
                "horizon must be at least one trading day".to_string(),
            ));
        }
        if self.decay_horizons.contains(&0) {
            return Err(BacktestError::InvalidRequest(
                "decay horizons must be at least one trading day".to_string(),
            ));
        }
        Ok(())
    }

    /// 排序去重後的衰減期限
    pub fn normalized_decay_horizons(&self) -> Vec<usize> {
        let mut horizons = self.decay_horizons.clone();
        horizons.sort_unstable();
        horizons.dedup();
        horizons
    }
}

/// 時點回測引擎
pub struct PitBacktester<S: SnapshotService, P: RawDataProvider> {
    snapshot_service: S,
    provider: P,
    config: EngineConfig,
    throttle: ProgressThrottle,
    state: RunState,
}

impl<S: SnapshotService, P: RawDataProvider> PitBacktester<S, P> {
    /// 創建引擎；配置不合法時拒絕
    pub fn new(snapshot_service: S, provider: P, config: EngineConfig) -> Result<Self, BacktestError> {
        config.validate()?;

        let throttle = ProgressThrottle::new(config.progress_interval());
        Ok(Self {
            snapshot_service,
            provider,
            config,
            throttle,
            state: RunState::new(),
        })
    }

    /// 替換進度節流使用的時鐘
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.throttle = ProgressThrottle::with_clock(self.config.progress_interval(), clock);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot_service(&self) -> &S {
        &self.snapshot_service
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.state.snapshot()
    }

    /// 最近一次運行所處（或結束時）的階段
    pub fn phase(&self) -> RunPhase {
        self.state.phase()
    }

    /// 鎖定快照並加載按快照邊界截斷的數據
    ///
    /// `existing_id` 為 `None` 時向版本服務請求新快照；否則查找既有快照，
    /// 不存在時返回 [`PitViolationError::SnapshotNotFound`]。已有鎖定時先釋放。
    pub fn lock(&mut self, existing_id: Option<&str>) -> Result<Snapshot, BacktestError> {
        self.state.release();

        let snapshot = match existing_id {
            None => self.snapshot_service.create_snapshot()?,
            Some(id) => self
                .snapshot_service
                .get_snapshot(id)?
                .ok_or_else(|| PitViolationError::SnapshotNotFound(id.to_string()))?,
        };

        let prices_end = snapshot.date_range_end(DatasetKind::Prices)?;
        let prices = PriceTable::new(self.provider.load_prices(prices_end)?, prices_end);

        let fundamentals = match snapshot.date_range_end(DatasetKind::Fundamentals) {
            Ok(end) => Some(FundamentalTable::new(
                self.provider.load_fundamentals(end)?,
                end,
            )),
            Err(_) => None,
        };

        info!(
            snapshot_id = %snapshot.snapshot_id,
            version_tag = %snapshot.version_tag,
            price_rows = prices.len(),
            fundamental_rows = fundamentals.as_ref().map_or(0, |t| t.len()),
            "鎖定快照"
        );

        self.state.bind(snapshot.clone(), prices, fundamentals);
        Ok(snapshot)
    }

    /// 解除快照與快取；重複調用無副作用
    pub fn release(&mut self) {
        self.state.release();
    }

    /// `as_of` 時可見的價格
    pub fn prices_as_of(&self, as_of: NaiveDate) -> Result<Vec<PriceRecord>, PitViolationError> {
        self.state
            .view(self.config.filing_lag_days)?
            .prices_as_of(as_of)
    }

    /// `as_of` 時已過申報滯後期的基本面
    pub fn fundamentals_as_of(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<FundamentalRecord>, PitViolationError> {
        self.state
            .view(self.config.filing_lag_days)?
            .fundamentals_as_of(as_of)
    }

    /// `as_of` 的 `horizon` 期遠期收益
    pub fn forward_returns(
        &self,
        as_of: NaiveDate,
        horizon: usize,
    ) -> Result<Vec<ForwardReturn>, ForwardReturnError> {
        let table = self.state.prices()?;
        if as_of > table.date_range_end() {
            return Err(PitViolationError::BeyondSnapshot {
                dataset: DatasetKind::Prices,
                requested: as_of,
                date_range_end: table.date_range_end(),
            }
            .into());
        }
        forward_returns(table, as_of, horizon)
    }

    /// 執行回測
    ///
    /// 數據耗盡時提前終止並返回部分結果；取消時返回 [`BacktestError::Cancelled`]，
    /// 返回前快照與快取已經釋放。
    pub fn run_backtest(
        &mut self,
        alpha: &dyn AlphaStrategy,
        request: &BacktestRequest,
        mut hooks: RunHooks<'_>,
    ) -> Result<BacktestResult, BacktestError> {
        request.validate()?;

        if let Err(cancelled) = hooks.check_cancel() {
            warn!(reason = %cancelled.reason, "回測在鎖定快照前被取消");
            self.state.set_phase(RunPhase::Cancelled);
            return Err(cancelled.into());
        }

        let started = Instant::now();
        BacktestMetrics::record_run_started();

        if let Err(err) = self.lock(request.snapshot_id.as_deref()) {
            self.state.set_phase(RunPhase::Failed);
            BacktestMetrics::record_run_finished(RunOutcome::Failed, started.elapsed());
            return Err(err);
        }

        let outcome = {
            let mut guard = RunStateGuard::new(&mut self.state);
            let outcome = evaluate(
                &mut guard,
                &self.config,
                &self.throttle,
                alpha,
                request,
                &mut hooks,
            );
            let phase = match &outcome {
                Ok((_, RunTermination::Completed)) => RunPhase::Completed,
                Ok((_, RunTermination::HaltedEarly)) => RunPhase::HaltedEarly,
                Err(err) if err.is_cancelled() => RunPhase::Cancelled,
                Err(_) => RunPhase::Failed,
            };
            guard.set_phase(phase);

            outcome.map(|(result, _)| result)
        };

        let run_outcome = match (&outcome, self.state.phase()) {
            (_, RunPhase::HaltedEarly) => RunOutcome::HaltedEarly,
            (Ok(_), _) => RunOutcome::Completed,
            (Err(err), _) if err.is_cancelled() => RunOutcome::Cancelled,
            (Err(_), _) => RunOutcome::Failed,
        };
        BacktestMetrics::record_run_finished(run_outcome, started.elapsed());

        match &outcome {
            Ok(result) => info!(
                run_id = %result.run_id,
                alpha = %result.alpha_name,
                dates = result.dates_evaluated(),
                termination = ?result.termination,
                "回測完成"
            ),
            Err(err) if err.is_cancelled() => warn!(error = %err, "回測已取消，狀態已釋放"),
            Err(err) => warn!(error = %err, "回測失敗，狀態已釋放"),
        }

        outcome
    }
}

/// 逐日評估；狀態由調用方的守衛釋放
fn evaluate(
    state: &mut RunState,
    config: &EngineConfig,
    throttle: &ProgressThrottle,
    alpha: &dyn AlphaStrategy,
    request: &BacktestRequest,
    hooks: &mut RunHooks<'_>,
) -> Result<(BacktestResult, RunTermination), BacktestError> {
    let horizon = request.horizon.unwrap_or(config.default_horizon);
    let decay_horizons = request.normalized_decay_horizons();

    let snapshot = state
        .snapshot()
        .cloned()
        .ok_or(PitViolationError::NoSnapshotLocked)?;
    let prices_end = state.prices()?.date_range_end();
    if request.start_date > prices_end {
        return Err(PitViolationError::BeyondSnapshot {
            dataset: DatasetKind::Prices,
            requested: request.start_date,
            date_range_end: prices_end,
        }
        .into());
    }

    let dates: Vec<NaiveDate> = state
        .prices()?
        .calendar()
        .iter()
        .copied()
        .filter(|d| *d >= request.start_date && *d <= request.end_date)
        .collect();

    info!(
        alpha = alpha.name(),
        start = %request.start_date,
        end = %request.end_date,
        trading_dates = dates.len(),
        horizon,
        weight_method = %request.weight_method,
        "開始回測"
    );

    let mut acc = RunAccumulator::new(request.weight_method, config.quantile, &decay_horizons);
    let mut clock = throttle.start(hooks.progress.as_deref_mut());
    let mut termination = RunTermination::Completed;

    for (i, &date) in dates.iter().enumerate() {
        hooks.check_cancel()?;
        state.set_phase(RunPhase::Iterating(date));

        let view = state.view(config.filing_lag_days)?;
        let prices = view.prices_as_of(date)?;
        // 快照沒有基本面數據集時傳入空切片
        let fundamentals = if view.has_fundamentals() {
            view.fundamentals_as_of(date)?
        } else {
            Vec::new()
        };
        let signals = alpha.compute_raw(&prices, &fundamentals, date)?;

        let table = view.price_table();
        let forward = match forward_returns(table, date, horizon) {
            Ok(forward) => forward,
            Err(err) if err.is_exhausted() => {
                info!(date = %date, error = %err, "遠期收益數據耗盡，提前終止");
                termination = RunTermination::HaltedEarly;
                break;
            }
            Err(err) => return Err(err.into()),
        };

        let mut decay = Vec::with_capacity(decay_horizons.len());
        let mut exhausted = false;
        for &h in &decay_horizons {
            match forward_returns(table, date, h) {
                Ok(returns) => decay.push((h, returns)),
                Err(err) if err.is_exhausted() => {
                    info!(date = %date, horizon = h, "衰減期限的遠期收益數據耗盡，提前終止");
                    exhausted = true;
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }
        if exhausted {
            termination = RunTermination::HaltedEarly;
            break;
        }

        acc.fold_date(date, &signals, &forward, table.universe_size(date), &decay);
        BacktestMetrics::record_date_processed();
        debug!(date = %date, signals = signals.len(), forward = forward.len(), "日期處理完成");

        clock = throttle.emit(
            clock,
            percent_of(i + 1, dates.len()),
            false,
            hooks.progress.as_deref_mut(),
        );
    }

    throttle.finish(clock, hooks.progress.as_deref_mut());

    let result = aggregate(
        acc,
        RunContext {
            alpha_name: alpha.name(),
            start_date: request.start_date,
            end_date: request.end_date,
            horizon,
            weight_method: request.weight_method,
            snapshot: &snapshot,
            termination,
        },
        config,
    );

    Ok((result, termination))
}
