//! 带重试的翻译包装器
//!
//! 对上游的临时错误（网络、限流）按固定间隔重试，对永久错误（拒绝访问、
//! 配额耗尽）立即停止。重试耗尽或永久失败后按 `FailurePolicy` 处理：
//! 返回错误，或返回原文作为降级结果。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::guard::LengthGuard;
use super::translator::{TranslatedResult, Translator};
use crate::translation::config::{constants, FailurePolicy, TranslationConfig};
use crate::translation::error::{TranslationError, TranslationResult};

/// 可注入的等待函数，测试时替换为记录型实现
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// 使用 `std::thread::sleep` 阻塞当前线程
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// 重试配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_tries: u32,
    pub retry_delay: Duration,
    pub failure_policy: FailurePolicy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_tries: constants::DEFAULT_MAX_TRIES,
            retry_delay: constants::DEFAULT_RETRY_DELAY,
            failure_policy: FailurePolicy::Raise,
        }
    }
}

impl From<&TranslationConfig> for RetryConfig {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            max_tries: config.max_tries.max(1),
            retry_delay: config.retry_delay(),
            failure_policy: config.failure_policy,
        }
    }
}

/// 重试统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryStats {
    pub calls: u64,
    pub attempts: u64,
    pub retries: u64,
    pub permanent_failures: u64,
    pub exhausted: u64,
    pub degraded: u64,
}

#[derive(Debug, Default)]
struct RetryCounters {
    calls: AtomicU64,
    attempts: AtomicU64,
    retries: AtomicU64,
    permanent_failures: AtomicU64,
    exhausted: AtomicU64,
    degraded: AtomicU64,
}

impl RetryCounters {
    fn snapshot(&self) -> RetryStats {
        RetryStats {
            calls: self.calls.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            permanent_failures: self.permanent_failures.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
        }
    }
}

/// 单次调用的终止状态
enum Outcome {
    Success(TranslatedResult),
    PermanentFailure(TranslationError),
    /// 调用方或本地错误，重试无意义，也不适用降级策略
    Rejected(TranslationError),
    ExhaustedRetries {
        attempts: u32,
        last_error: TranslationError,
    },
}

/// 带重试的翻译器
pub struct RetryingTranslator<T, S = ThreadSleeper> {
    inner: T,
    config: RetryConfig,
    guard: LengthGuard,
    sleeper: S,
    cancel: Option<Arc<AtomicBool>>,
    counters: RetryCounters,
}

impl<T: Translator> RetryingTranslator<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self::with_sleeper(inner, config, ThreadSleeper)
    }
}

impl<T: Translator, S: Sleeper> RetryingTranslator<T, S> {
    pub fn with_sleeper(inner: T, config: RetryConfig, sleeper: S) -> Self {
        Self {
            inner,
            config,
            guard: LengthGuard::default(),
            sleeper,
            cancel: None,
            counters: RetryCounters::default(),
        }
    }

    pub fn with_guard(mut self, guard: LengthGuard) -> Self {
        self.guard = guard;
        self
    }

    /// 设置取消标志，置位后在下一次尝试或等待前返回 `Cancelled`
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn stats(&self) -> RetryStats {
        self.counters.snapshot()
    }

    fn check_cancelled(&self) -> TranslationResult<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::SeqCst) => Err(TranslationError::Cancelled),
            _ => Ok(()),
        }
    }

    /// 执行有界重试循环
    ///
    /// # 状态转换
    /// - 成功：立即返回结果
    /// - 永久错误：不再重试
    /// - 不可重试的错误（配置、缓存、取消等）：原样返回
    /// - 其他错误：未达上限时等待 `retry_delay` 后重试，否则视为重试耗尽
    fn attempt(&self, text: &str) -> TranslationResult<Outcome> {
        let max_tries = self.config.max_tries.max(1);
        let mut attempt = 1;

        loop {
            self.check_cancelled()?;
            self.counters.attempts.fetch_add(1, Ordering::Relaxed);

            let error = match self.inner.translate(text) {
                Ok(result) => {
                    if attempt > 1 {
                        tracing::info!("第 {} 次尝试翻译成功", attempt);
                    }
                    return Ok(Outcome::Success(result));
                }
                Err(error) => error,
            };

            if error.is_permanent() {
                tracing::error!("翻译服务拒绝请求，不再重试: {} ({})", preview(text), error);
                return Ok(Outcome::PermanentFailure(error));
            }

            if !error.is_retryable() {
                return Ok(Outcome::Rejected(error));
            }

            if attempt >= max_tries {
                return Ok(Outcome::ExhaustedRetries {
                    attempts: attempt,
                    last_error: error,
                });
            }

            tracing::warn!(
                "翻译失败，{:.1}秒后重试 (尝试 {}/{}): {}",
                self.config.retry_delay.as_secs_f32(),
                attempt,
                max_tries,
                error
            );

            self.check_cancelled()?;
            self.sleeper.sleep(self.config.retry_delay);
            self.counters.retries.fetch_add(1, Ordering::Relaxed);
            attempt += 1;
        }
    }

    fn degrade(&self, text: &str, reason: &TranslationError) -> TranslatedResult {
        self.counters.degraded.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("翻译失败，使用原文代替: {} ({})", preview(text), reason);
        TranslatedResult::untranslated(text)
    }
}

impl<T: Translator, S: Sleeper> Translator for RetryingTranslator<T, S> {
    fn translate(&self, text: &str) -> TranslationResult<TranslatedResult> {
        self.counters.calls.fetch_add(1, Ordering::Relaxed);
        let text = self.guard.apply(text)?;

        match self.attempt(&text)? {
            Outcome::Success(result) => Ok(result),
            Outcome::Rejected(error) => Err(error),
            Outcome::PermanentFailure(error) => {
                self.counters.permanent_failures.fetch_add(1, Ordering::Relaxed);
                match self.config.failure_policy {
                    FailurePolicy::Degrade => Ok(self.degrade(&text, &error)),
                    FailurePolicy::Raise => {
                        Err(TranslationError::PermanentFailure(Box::new(error)))
                    }
                }
            }
            Outcome::ExhaustedRetries {
                attempts,
                last_error,
            } => {
                self.counters.exhausted.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    "翻译经 {} 次尝试后仍然失败: {}",
                    attempts,
                    preview(&text)
                );
                match self.config.failure_policy {
                    FailurePolicy::Degrade => Ok(self.degrade(&text, &last_error)),
                    FailurePolicy::Raise => Err(TranslationError::RetriesExhausted {
                        attempts,
                        last_error: Box::new(last_error),
                    }),
                }
            }
        }
    }
}

/// 日志和错误信息中只显示文本开头
pub(crate) fn preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 60;
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().nth(PREVIEW_CHARS).is_some() {
        preview.push('…');
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct Scripted {
        calls: Cell<u32>,
        fail_first: u32,
        permanent: bool,
    }

    impl Scripted {
        fn failing(fail_first: u32) -> Self {
            Self {
                calls: Cell::new(0),
                fail_first,
                permanent: false,
            }
        }
    }

    impl Translator for Scripted {
        fn translate(&self, text: &str) -> TranslationResult<TranslatedResult> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() <= self.fail_first {
                if self.permanent {
                    return Err(TranslationError::Forbidden("daily limit exceeded".to_string()));
                }
                return Err(TranslationError::NetworkError("connection reset".to_string()));
            }
            Ok(TranslatedResult::new(text.to_uppercase()))
        }
    }

    #[derive(Default)]
    struct Recorder {
        sleeps: RefCell<Vec<Duration>>,
    }

    impl Sleeper for Recorder {
        fn sleep(&self, duration: Duration) {
            self.sleeps.borrow_mut().push(duration);
        }
    }

    #[test]
    fn test_recovers_after_transient_failures() {
        let sleeper = Recorder::default();
        let config = RetryConfig::default();
        let retrying = RetryingTranslator::with_sleeper(Scripted::failing(2), config, &sleeper);

        let result = retrying.translate("hola").unwrap();
        assert_eq!(result.translated_text, "HOLA");
        assert_eq!(retrying.inner().calls.get(), 3);
        assert_eq!(
            *sleeper.sleeps.borrow(),
            vec![Duration::from_secs(100), Duration::from_secs(100)]
        );

        let stats = retrying.stats();
        assert_eq!(stats.attempts, 3);
        assert_eq!(stats.retries, 2);
    }

    #[test]
    fn test_cancel_flag_stops_before_first_attempt() {
        let flag = Arc::new(AtomicBool::new(true));
        let retrying = RetryingTranslator::with_sleeper(
            Scripted::failing(0),
            RetryConfig::default(),
            Recorder::default(),
        )
        .with_cancel_flag(flag);

        assert!(matches!(retrying.translate("hola"), Err(TranslationError::Cancelled)));
        assert_eq!(retrying.inner().calls.get(), 0);
    }

    #[test]
    fn test_guard_rejects_before_any_attempt() {
        let retrying = RetryingTranslator::with_sleeper(
            Scripted::failing(0),
            RetryConfig::default(),
            Recorder::default(),
        )
        .with_guard(LengthGuard::new(4, crate::translation::config::LengthPolicy::Reject));

        let error = retrying.translate("too long").unwrap_err();
        assert!(matches!(error, TranslationError::InputTooLong { .. }));
        assert_eq!(retrying.inner().calls.get(), 0);
    }

    #[test]
    fn test_single_try_config_never_sleeps() {
        let sleeper = Recorder::default();
        let config = RetryConfig {
            max_tries: 1,
            ..RetryConfig::default()
        };
        let retrying = RetryingTranslator::with_sleeper(Scripted::failing(5), config, &sleeper);

        let error = retrying.translate("hola").unwrap_err();
        assert!(matches!(error, TranslationError::RetriesExhausted { attempts: 1, .. }));
        assert!(sleeper.sleeps.borrow().is_empty());
    }

    struct Misconfigured {
        calls: Cell<u32>,
    }

    impl Translator for Misconfigured {
        fn translate(&self, _text: &str) -> TranslationResult<TranslatedResult> {
            self.calls.set(self.calls.get() + 1);
            Err(TranslationError::ConfigError("missing api key".to_string()))
        }
    }

    #[test]
    fn test_non_retryable_error_returns_without_sleeping() {
        let sleeper = Recorder::default();
        let config = RetryConfig {
            failure_policy: FailurePolicy::Degrade,
            ..RetryConfig::default()
        };
        let retrying = RetryingTranslator::with_sleeper(
            Misconfigured {
                calls: Cell::new(0),
            },
            config,
            &sleeper,
        );

        let error = retrying.translate("hola").unwrap_err();
        assert!(matches!(error, TranslationError::ConfigError(_)));
        assert_eq!(retrying.inner().calls.get(), 1);
        assert!(sleeper.sleeps.borrow().is_empty());
        assert_eq!(retrying.stats().degraded, 0);
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "x".repeat(100);
        assert_eq!(preview(&long).chars().count(), 61);
        assert_eq!(preview("short"), "short");
    }
}
