//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量管理

use std::env;
use std::fmt;
use std::time::Duration;

use crate::translation::config::{constants, FailurePolicy, LengthPolicy};

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 仅在变量已设置时解析，未设置返回 `None`
    fn try_get() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "ENGAGENY_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// 目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "ENGAGENY_TRANSLATION_TARGET_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Target language for translation (e.g. es, zh-cn)";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(constants::DEFAULT_TARGET_LANG.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_language(value, Self::NAME)
        }
    }

    /// 源语言
    pub struct SourceLang;
    impl EnvVar<String> for SourceLang {
        const NAME: &'static str = "ENGAGENY_TRANSLATION_SOURCE_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Source language of the scraped content";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(constants::DEFAULT_SOURCE_LANG.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_language(value, Self::NAME)
        }
    }

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "ENGAGENY_TRANSLATION_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Translation API endpoint URL";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(constants::DEFAULT_API_URL.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "ENGAGENY_TRANSLATION_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "API key sent with every translation request";

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key must not be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// 翻译模型
    pub struct Model;
    impl EnvVar<String> for Model {
        const NAME: &'static str = "ENGAGENY_TRANSLATION_MODEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Translation model: nmt or base";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(constants::DEFAULT_MODEL.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                "nmt" | "base" => Ok(value.trim().to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid model '{}'. Use: nmt, base", value),
                }),
            }
        }
    }

    /// 最大尝试次数
    pub struct MaxTries;
    impl EnvVar<u32> for MaxTries {
        const NAME: &'static str = "ENGAGENY_TRANSLATION_MAX_TRIES";
        const DEFAULT: Option<u32> = Some(constants::DEFAULT_MAX_TRIES);
        const DESCRIPTION: &'static str = "Attempts per text before giving up";

        fn parse(value: &str) -> EnvResult<u32> {
            parse_positive_usize(value, Self::NAME, 1, 20).map(|n| n as u32)
        }
    }

    /// 重试间隔
    pub struct RetryDelay;
    impl EnvVar<Duration> for RetryDelay {
        const NAME: &'static str = "ENGAGENY_TRANSLATION_RETRY_DELAY";
        const DEFAULT: Option<Duration> = Some(constants::DEFAULT_RETRY_DELAY);
        const DESCRIPTION: &'static str = "Seconds to wait between attempts";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 0, 3600)
        }
    }

    /// 单次请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "ENGAGENY_TRANSLATION_REQUEST_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(constants::DEFAULT_REQUEST_TIMEOUT);
        const DESCRIPTION: &'static str = "HTTP request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 300)
        }
    }

    /// 最大文本长度
    pub struct MaxTextLength;
    impl EnvVar<usize> for MaxTextLength {
        const NAME: &'static str = "ENGAGENY_TRANSLATION_MAX_TEXT_LENGTH";
        const DEFAULT: Option<usize> = Some(constants::MAX_TEXT_LENGTH);
        const DESCRIPTION: &'static str = "Maximum characters sent in one request";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 100_000)
        }
    }

    /// 超长文本策略
    pub struct LengthPolicyVar;
    impl EnvVar<LengthPolicy> for LengthPolicyVar {
        const NAME: &'static str = "ENGAGENY_TRANSLATION_LENGTH_POLICY";
        const DEFAULT: Option<LengthPolicy> = Some(LengthPolicy::Reject);
        const DESCRIPTION: &'static str = "Over-long text handling: reject, truncate";

        fn parse(value: &str) -> EnvResult<LengthPolicy> {
            value.parse().map_err(|message| EnvError {
                variable: Self::NAME.to_string(),
                message,
            })
        }
    }

    /// 失败策略
    pub struct FailurePolicyVar;
    impl EnvVar<FailurePolicy> for FailurePolicyVar {
        const NAME: &'static str = "ENGAGENY_TRANSLATION_FAILURE_POLICY";
        const DEFAULT: Option<FailurePolicy> = Some(FailurePolicy::Raise);
        const DESCRIPTION: &'static str =
            "On permanent failure or exhausted retries: raise, degrade";

        fn parse(value: &str) -> EnvResult<FailurePolicy> {
            value.parse().map_err(|message| EnvError {
                variable: Self::NAME.to_string(),
                message,
            })
        }
    }
}

/// 缓存相关环境变量
pub mod cache {
    use super::*;

    /// 缓存目录
    pub struct Dir;
    impl EnvVar<String> for Dir {
        const NAME: &'static str = "ENGAGENY_CACHE_DIR";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Directory holding translation-cache-<lang> stores";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(constants::DEFAULT_CACHE_DIR.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let dir = value.trim();
            if dir.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Cache directory must not be empty".to_string(),
                });
            }
            Ok(dir.to_string())
        }
    }
}

/// 辅助函数
fn parse_language(value: &str, var_name: &str) -> EnvResult<String> {
    let lang = value.trim().to_lowercase();
    let valid = match lang.split_once('-') {
        Some((base, region)) => base.len() == 2 && region.len() == 2,
        None => lang.len() == 2,
    };

    if valid && lang.chars().all(|c| c.is_ascii_lowercase() || c == '-') {
        Ok(lang)
    } else {
        Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid language code '{}'. Use: xx or xx-yy", value),
        })
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_seconds(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<Duration> {
    let seconds: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of seconds".to_string(),
    })?;

    if seconds < min || seconds > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Seconds must be between {} and {}", min, max),
        });
    }

    Ok(Duration::from_secs(seconds))
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    // 核心配置
    pub log_level: String,
    pub no_color: bool,

    // 翻译配置
    pub translation_target_lang: String,
    pub translation_source_lang: String,
    pub translation_api_url: String,
    pub translation_api_key: Option<String>,
    pub translation_model: String,
    pub translation_max_tries: u32,
    pub translation_retry_delay: Duration,
    pub translation_request_timeout: Duration,
    pub translation_max_text_length: usize,
    pub translation_length_policy: LengthPolicy,
    pub translation_failure_policy: FailurePolicy,

    // 缓存配置
    pub cache_dir: String,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,

            translation_target_lang: translation::TargetLang::get()?,
            translation_source_lang: translation::SourceLang::get()?,
            translation_api_url: translation::ApiUrl::get()?,
            translation_api_key: translation::ApiKey::get().ok(),
            translation_model: translation::Model::get()?,
            translation_max_tries: translation::MaxTries::get()?,
            translation_retry_delay: translation::RetryDelay::get()?,
            translation_request_timeout: translation::RequestTimeout::get()?,
            translation_max_text_length: translation::MaxTextLength::get()?,
            translation_length_policy: translation::LengthPolicyVar::get()?,
            translation_failure_policy: translation::FailurePolicyVar::get()?,

            cache_dir: cache::Dir::get()?,
        })
    }

    /// 打印配置摘要（隐藏敏感信息）
    pub fn print_summary(&self) {
        println!("Environment Configuration Summary:");
        println!("  Log Level: {}", self.log_level);
        println!(
            "  Translation: {} -> {}",
            self.translation_source_lang, self.translation_target_lang
        );
        println!("  API URL: {}", self.translation_api_url);
        println!(
            "  Retry: {} tries, {}s apart, on failure: {}",
            self.translation_max_tries,
            self.translation_retry_delay.as_secs(),
            self.translation_failure_policy
        );
        println!("  Cache Dir: {}", self.cache_dir);
        if self.translation_api_key.is_some() {
            println!("  API Key: [configured]");
        }
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    fn line<T: fmt::Debug>(name: &str, description: &str, default: Option<T>) -> String {
        format!("- `{}`: {} (default: {:?})\n", name, description, default)
    }

    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    docs.push_str(&line(core::LogLevel::NAME, core::LogLevel::DESCRIPTION, Some("info")));
    docs.push_str(&line(core::NoColor::NAME, core::NoColor::DESCRIPTION, core::NoColor::DEFAULT));

    docs.push_str("\n## Translation Configuration\n\n");
    docs.push_str(&line(
        translation::TargetLang::NAME,
        translation::TargetLang::DESCRIPTION,
        Some(constants::DEFAULT_TARGET_LANG),
    ));
    docs.push_str(&line(
        translation::SourceLang::NAME,
        translation::SourceLang::DESCRIPTION,
        Some(constants::DEFAULT_SOURCE_LANG),
    ));
    docs.push_str(&line(
        translation::ApiUrl::NAME,
        translation::ApiUrl::DESCRIPTION,
        Some(constants::DEFAULT_API_URL),
    ));
    docs.push_str(&line(
        translation::ApiKey::NAME,
        translation::ApiKey::DESCRIPTION,
        translation::ApiKey::DEFAULT,
    ));
    docs.push_str(&line(
        translation::Model::NAME,
        translation::Model::DESCRIPTION,
        Some(constants::DEFAULT_MODEL),
    ));
    docs.push_str(&line(
        translation::MaxTries::NAME,
        translation::MaxTries::DESCRIPTION,
        translation::MaxTries::DEFAULT,
    ));
    docs.push_str(&line(
        translation::RetryDelay::NAME,
        translation::RetryDelay::DESCRIPTION,
        translation::RetryDelay::DEFAULT,
    ));
    docs.push_str(&line(
        translation::RequestTimeout::NAME,
        translation::RequestTimeout::DESCRIPTION,
        translation::RequestTimeout::DEFAULT,
    ));
    docs.push_str(&line(
        translation::MaxTextLength::NAME,
        translation::MaxTextLength::DESCRIPTION,
        translation::MaxTextLength::DEFAULT,
    ));
    docs.push_str(&line(
        translation::LengthPolicyVar::NAME,
        translation::LengthPolicyVar::DESCRIPTION,
        translation::LengthPolicyVar::DEFAULT,
    ));
    docs.push_str(&line(
        translation::FailurePolicyVar::NAME,
        translation::FailurePolicyVar::DESCRIPTION,
        translation::FailurePolicyVar::DEFAULT,
    ));

    docs.push_str("\n## Cache Configuration\n\n");
    docs.push_str(&line(
        cache::Dir::NAME,
        cache::Dir::DESCRIPTION,
        Some(constants::DEFAULT_CACHE_DIR),
    ));

    docs
}
