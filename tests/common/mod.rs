// 集成测试公共模块
//
// 提供桩翻译器、记录型等待函数和临时缓存目录

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use engageny_chef::translation::core::{Sleeper, TranslatedResult, Translator};
use engageny_chef::translation::error::{TranslationError, TranslationResult};
use engageny_chef::translation::storage::TranslationCache;

/// 临时缓存目录，随测试结束删除
pub struct TestEnvironment {
    pub dir: tempfile::TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn open_cache(&self, lang: &str) -> TranslationCache {
        TranslationCache::open(self.dir.path(), lang).expect("open cache")
    }
}

/// 总是成功的翻译器，记录调用次数
#[derive(Default)]
pub struct CountingTranslator {
    calls: AtomicU32,
}

impl CountingTranslator {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Translator for CountingTranslator {
    fn translate(&self, text: &str) -> TranslationResult<TranslatedResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TranslatedResult::new(format!("<es>{}</es>", text))
            .with_detected_language("en")
            .with_model("nmt"))
    }
}

/// 失败类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transient,
    Permanent,
    /// 本地配置问题，与网络无关
    Misconfigured,
}

/// 前 `fail_first` 次调用失败，之后成功
pub struct FailingTranslator {
    kind: FailureKind,
    fail_first: u32,
    calls: AtomicU32,
}

impl FailingTranslator {
    pub fn always(kind: FailureKind) -> Self {
        Self::first(kind, u32::MAX)
    }

    pub fn first(kind: FailureKind, fail_first: u32) -> Self {
        Self {
            kind,
            fail_first,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Translator for FailingTranslator {
    fn translate(&self, text: &str) -> TranslationResult<TranslatedResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.fail_first {
            return Err(match self.kind {
                FailureKind::Transient => {
                    TranslationError::NetworkError("connection reset by peer".to_string())
                }
                FailureKind::Permanent => {
                    TranslationError::Forbidden("HTTP 403: Daily Limit Exceeded".to_string())
                }
                FailureKind::Misconfigured => {
                    TranslationError::ConfigError("API key is not configured".to_string())
                }
            });
        }
        Ok(TranslatedResult::new(format!("<es>{}</es>", text)))
    }
}

/// 只记录不等待
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("sleeper lock").clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().expect("sleeper lock").push(duration);
    }
}

/// 测试数据生成器
pub struct TestDataGenerator;

impl TestDataGenerator {
    /// 生成互不相同的课程标题
    pub fn lesson_titles(count: usize) -> Vec<String> {
        (1..=count)
            .map(|i| format!("Grade {} Module {} Lesson {}", i % 12 + 1, i % 6 + 1, i))
            .collect()
    }
}
