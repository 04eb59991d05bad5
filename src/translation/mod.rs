//! 翻译模块
//!
//! - **core**: 翻译能力、重试包装器、缓存客户端、上游客户端
//! - **storage**: 按目标语言划分的持久化缓存
//! - **config**: 配置管理
//! - **error**: 错误处理

pub mod config;
pub mod core;
pub mod error;
pub mod storage;

pub use config::{constants, ConfigManager, FailurePolicy, LengthPolicy, TranslationConfig};
pub use self::core::{
    CachingClient, GoogleTranslator, LengthGuard, RetryConfig, RetryStats, RetryingTranslator,
    Sleeper, ThreadSleeper, TranslatedResult, TranslationResponse, Translator,
};
pub use error::{ErrorSeverity, TranslationError, TranslationResult};
pub use storage::{fingerprint, CacheStats, TranslationCache};
