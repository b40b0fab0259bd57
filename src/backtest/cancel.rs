//! 協作式取消與回調鉤子

use thiserror::Error;

/// 調用方中止回測時返回的信號
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("job cancelled: {reason}")]
pub struct JobCancelled {
    pub reason: String,
}

impl JobCancelled {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// 取消檢查：未取消時返回 `Ok(())`
pub type CancelCheck<'a> = dyn FnMut() -> Result<(), JobCancelled> + 'a;

/// 進度回調：接收 0..=100 的百分比
pub type ProgressSink<'a> = dyn FnMut(u8) + 'a;

/// 單次運行注入的回調，兩者皆可省略
#[derive(Default)]
pub struct RunHooks<'a> {
    pub progress: Option<&'a mut ProgressSink<'a>>,
    pub cancel: Option<&'a mut CancelCheck<'a>>,
}

impl<'a> RunHooks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(mut self, sink: &'a mut ProgressSink<'a>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn with_cancel(mut self, check: &'a mut CancelCheck<'a>) -> Self {
        self.cancel = Some(check);
        self
    }

    /// 輪詢取消檢查
    pub fn check_cancel(&mut self) -> Result<(), JobCancelled> {
        match self.cancel.as_deref_mut() {
            Some(check) => check(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_check_after_n_calls() {
        let mut calls = 0;
        let mut cancel = || {
            calls += 1;
            if calls > 2 {
                Err(JobCancelled::new("stop"))
            } else {
                Ok(())
            }
        };
        let mut hooks = RunHooks::new().with_cancel(&mut cancel);

        assert!(hooks.check_cancel().is_ok());
        assert!(hooks.check_cancel().is_ok());
        let err = hooks.check_cancel().unwrap_err();
        assert_eq!(err.to_string(), "job cancelled: stop");
    }

    #[test]
    fn test_empty_hooks_are_noops() {
        let mut hooks = RunHooks::new();
        assert!(hooks.check_cancel().is_ok());
        assert!(hooks.progress.is_none());
    }
}
