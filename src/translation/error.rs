//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 速率限制错误
    #[error("请求速率过快，已达到限制")]
    RateLimitExceeded,

    /// 文本超过上游服务的长度限制
    #[error("文本过长: {length} 个字符，上限为 {max}")]
    InputTooLong { length: usize, max: usize },

    /// 上游拒绝访问（配额耗尽、密钥无效等），重试无法恢复
    #[error("访问被拒绝: {0}")]
    Forbidden(String),

    /// 永久性失败，未进行重试
    #[error("翻译永久失败: {0}")]
    PermanentFailure(Box<TranslationError>),

    /// 指定文本翻译失败，`text` 为原文开头
    #[error("翻译 \"{text}\" 失败: {source}")]
    TextFailed {
        text: String,
        source: Box<TranslationError>,
    },

    /// 重试次数耗尽
    #[error("经 {attempts} 次尝试后仍然失败: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: Box<TranslationError>,
    },

    /// 翻译服务错误
    #[error("翻译服务错误: {0}")]
    TranslationServiceError(String),

    /// 缓存错误
    #[error("缓存错误: {0}")]
    CacheError(String),

    /// 底层存储错误
    #[error("存储错误: {0}")]
    StoreError(#[from] redb::Error),

    /// 缓存中不存在该键
    #[error("缓存键不存在: {0}")]
    NotFound(String),

    /// 缓存已关闭
    #[error("缓存已关闭")]
    CacheClosed,

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 操作被调用方取消
    #[error("操作已取消")]
    Cancelled,
}

impl TranslationError {
    /// 检查错误是否属于永久性失败（重试无意义）
    pub fn is_permanent(&self) -> bool {
        match self {
            TranslationError::Forbidden(_) | TranslationError::PermanentFailure(_) => true,
            TranslationError::TextFailed { source, .. } => source.is_permanent(),
            _ => false,
        }
    }

    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError(_) => true,
            TranslationError::RateLimitExceeded => true,
            TranslationError::TranslationServiceError(_) => true,
            TranslationError::SerializationError(_) => true,
            TranslationError::IoError(_) => true,
            TranslationError::ConfigError(_) => false,
            TranslationError::InputTooLong { .. } => false,
            TranslationError::Forbidden(_) => false,
            TranslationError::PermanentFailure(_) => false,
            TranslationError::TextFailed { .. } => false,
            TranslationError::RetriesExhausted { .. } => false,
            TranslationError::CacheError(_) => false,
            TranslationError::StoreError(_) => false,
            TranslationError::NotFound(_) => false,
            TranslationError::CacheClosed => false,
            TranslationError::Cancelled => false,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::NetworkError(_) => ErrorSeverity::Warning,
            TranslationError::RateLimitExceeded => ErrorSeverity::Warning,
            TranslationError::InputTooLong { .. } => ErrorSeverity::Error,
            TranslationError::Forbidden(_) => ErrorSeverity::Critical,
            TranslationError::PermanentFailure(_) => ErrorSeverity::Critical,
            TranslationError::TextFailed { source, .. } => source.severity(),
            TranslationError::RetriesExhausted { .. } => ErrorSeverity::Error,
            TranslationError::TranslationServiceError(_) => ErrorSeverity::Warning,
            TranslationError::CacheError(_) => ErrorSeverity::Error,
            TranslationError::StoreError(_) => ErrorSeverity::Critical,
            TranslationError::NotFound(_) => ErrorSeverity::Info,
            TranslationError::CacheClosed => ErrorSeverity::Error,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::IoError(_) => ErrorSeverity::Error,
            TranslationError::Cancelled => ErrorSeverity::Warning,
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl From<redb::DatabaseError> for TranslationError {
    fn from(error: redb::DatabaseError) -> Self {
        TranslationError::StoreError(error.into())
    }
}

impl From<redb::TransactionError> for TranslationError {
    fn from(error: redb::TransactionError) -> Self {
        TranslationError::StoreError(error.into())
    }
}

impl From<redb::TableError> for TranslationError {
    fn from(error: redb::TableError) -> Self {
        TranslationError::StoreError(error.into())
    }
}

impl From<redb::StorageError> for TranslationError {
    fn from(error: redb::StorageError) -> Self {
        TranslationError::StoreError(error.into())
    }
}

impl From<redb::CommitError> for TranslationError {
    fn from(error: redb::CommitError) -> Self {
        TranslationError::StoreError(error.into())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ConfigError(format!("TOML解析错误: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            TranslationError::SerializationError(format!("响应解析失败: {}", error))
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 记录并返回错误
    pub fn log_error<T>(error: TranslationError) -> TranslationResult<T> {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("翻译严重错误: {}", error),
        }

        Err(error)
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::ConfigError(msg.to_string())
    }

    /// 创建缓存错误
    pub fn cache_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::CacheError(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_is_permanent() {
        let error = TranslationError::Forbidden("quota exceeded".to_string());
        assert!(error.is_permanent());
        assert!(!error.is_retryable());
        assert_eq!(error.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(TranslationError::NetworkError("reset".to_string()).is_retryable());
        assert!(TranslationError::RateLimitExceeded.is_retryable());
        assert!(!TranslationError::RateLimitExceeded.is_permanent());
    }

    #[test]
    fn test_caller_errors_are_not_retryable() {
        assert!(!TranslationError::ConfigError("bad key".to_string()).is_retryable());
        assert!(!TranslationError::InputTooLong { length: 6, max: 5 }.is_retryable());
        assert!(!TranslationError::CacheClosed.is_retryable());
    }

    #[test]
    fn test_text_failed_names_text_and_keeps_class() {
        let error = TranslationError::TextFailed {
            text: "Grade 3 Module 4".to_string(),
            source: Box::new(TranslationError::PermanentFailure(Box::new(
                TranslationError::Forbidden("HTTP 403".to_string()),
            ))),
        };

        assert!(error.to_string().contains("Grade 3 Module 4"));
        assert!(error.is_permanent());
        assert_eq!(error.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_retries_exhausted_keeps_last_error() {
        let error = TranslationError::RetriesExhausted {
            attempts: 4,
            last_error: Box::new(TranslationError::NetworkError("timeout".to_string())),
        };
        let message = error.to_string();
        assert!(message.contains('4'));
        assert!(message.contains("timeout"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: TranslationError = io.into();
        assert!(matches!(error, TranslationError::IoError(_)));
    }

    #[test]
    fn test_log_error_returns_err() {
        let result: TranslationResult<()> =
            helpers::log_error(helpers::cache_error("broken table"));
        assert!(matches!(result, Err(TranslationError::CacheError(_))));
    }
}
