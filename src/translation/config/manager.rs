//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::env::EnvError;
use crate::translation::error::{TranslationError, TranslationResult};

/// 超长文本的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    /// 直接拒绝，返回 `InputTooLong`
    #[default]
    Reject,
    /// 截断到上限并记录警告（兼容旧缓存）
    Truncate,
}

/// 永久失败或重试耗尽时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// 返回错误，由调用方决定是否中止
    #[default]
    Raise,
    /// 返回原文并记录警告
    Degrade,
}

impl FromStr for LengthPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "reject" => Ok(LengthPolicy::Reject),
            "truncate" => Ok(LengthPolicy::Truncate),
            other => Err(format!("Invalid length policy '{}'. Use: reject, truncate", other)),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "raise" => Ok(FailurePolicy::Raise),
            "degrade" => Ok(FailurePolicy::Degrade),
            other => Err(format!("Invalid failure policy '{}'. Use: raise, degrade", other)),
        }
    }
}

impl fmt::Display for LengthPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthPolicy::Reject => write!(f, "reject"),
            LengthPolicy::Truncate => write!(f, "truncate"),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Raise => write!(f, "raise"),
            FailurePolicy::Degrade => write!(f, "degrade"),
        }
    }
}

/// 翻译配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 基础配置
    pub target_lang: String,
    pub source_lang: String,
    pub api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub format: String,
    pub model: String,
    pub request_timeout_secs: u64,

    // 缓存配置
    pub cache_dir: String,

    // 重试配置
    pub max_tries: u32,
    pub retry_delay_secs: u64,
    pub failure_policy: FailurePolicy,

    // 长度限制
    pub max_text_length: usize,
    pub length_policy: LengthPolicy,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_lang: constants::DEFAULT_TARGET_LANG.to_string(),
            source_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            api_url: constants::DEFAULT_API_URL.to_string(),
            api_key: None,
            format: constants::DEFAULT_FORMAT.to_string(),
            model: constants::DEFAULT_MODEL.to_string(),
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),

            cache_dir: constants::DEFAULT_CACHE_DIR.to_string(),

            max_tries: constants::DEFAULT_MAX_TRIES,
            retry_delay_secs: constants::DEFAULT_RETRY_DELAY.as_secs(),
            failure_policy: FailurePolicy::default(),

            max_text_length: constants::MAX_TEXT_LENGTH,
            length_policy: LengthPolicy::default(),
        }
    }
}

impl TranslationConfig {
    /// 创建带指定语言的默认配置
    pub fn default_with_lang(target_lang: &str) -> Self {
        Self {
            target_lang: target_lang.to_string(),
            ..Self::default()
        }
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.target_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("目标语言不能为空".to_string()));
        }

        if self.source_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("源语言不能为空".to_string()));
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(TranslationError::ConfigError(format!(
                "API URL必须以 http:// 或 https:// 开头: {}",
                self.api_url
            )));
        }

        if self.max_tries == 0 {
            return Err(TranslationError::ConfigError("最大尝试次数不能为0".to_string()));
        }

        if self.max_text_length == 0 {
            return Err(TranslationError::ConfigError("最大文本长度不能为0".to_string()));
        }

        if self.cache_dir.trim().is_empty() {
            return Err(TranslationError::ConfigError("缓存目录不能为空".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖，仅覆盖已设置的变量
    pub fn apply_env_overrides(&mut self) -> TranslationResult<()> {
        use crate::env::{cache, translation, EnvVar};

        if let Some(target_lang) = translation::TargetLang::try_get() {
            self.target_lang = target_lang.map_err(env_error)?;
        }

        if let Some(source_lang) = translation::SourceLang::try_get() {
            self.source_lang = source_lang.map_err(env_error)?;
        }

        if let Some(api_url) = translation::ApiUrl::try_get() {
            self.api_url = api_url.map_err(env_error)?;
            tracing::info!("环境变量覆盖 API URL: {}", self.api_url);
        }

        if let Some(api_key) = translation::ApiKey::try_get() {
            self.api_key = Some(api_key.map_err(env_error)?);
        }

        if let Some(model) = translation::Model::try_get() {
            self.model = model.map_err(env_error)?;
        }

        if let Some(max_tries) = translation::MaxTries::try_get() {
            self.max_tries = max_tries.map_err(env_error)?;
        }

        if let Some(delay) = translation::RetryDelay::try_get() {
            self.retry_delay_secs = delay.map_err(env_error)?.as_secs();
        }

        if let Some(timeout) = translation::RequestTimeout::try_get() {
            self.request_timeout_secs = timeout.map_err(env_error)?.as_secs();
        }

        if let Some(max_length) = translation::MaxTextLength::try_get() {
            self.max_text_length = max_length.map_err(env_error)?;
        }

        if let Some(policy) = translation::LengthPolicyVar::try_get() {
            self.length_policy = policy.map_err(env_error)?;
        }

        if let Some(policy) = translation::FailurePolicyVar::try_get() {
            self.failure_policy = policy.map_err(env_error)?;
        }

        // 缓存相关环境变量
        if let Some(cache_dir) = cache::Dir::try_get() {
            self.cache_dir = cache_dir.map_err(env_error)?;
        }

        Ok(())
    }

    /// 展开后的缓存目录
    pub fn cache_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.cache_dir).as_ref())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_error(error: EnvError) -> TranslationError {
    TranslationError::ConfigError(error.to_string())
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();
        let source = Self::find_config_file();
        let config = match &source {
            Some(path) => {
                tracing::info!("加载配置文件: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                tracing::info!("未找到配置文件，使用默认配置");
                TranslationConfig::default()
            }
        };

        Self::finish(config, source)
    }

    /// 从指定文件创建配置管理器
    pub fn from_file<P: AsRef<Path>>(path: P) -> TranslationResult<Self> {
        Self::load_dotenv();
        let path = path.as_ref();
        tracing::info!("加载配置文件: {}", path.display());
        let config = Self::load_from_file(path)?;

        Self::finish(config, Some(path.to_path_buf()))
    }

    fn finish(mut config: TranslationConfig, source: Option<PathBuf>) -> TranslationResult<Self> {
        config.apply_env_overrides()?;
        config.validate()?;

        Ok(Self { config, source })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 配置文件路径（若有）
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 按目标语言派生配置
    pub fn config_for_language(&self, target_lang: &str) -> TranslationConfig {
        if self.config.target_lang == target_lang {
            return self.config.clone();
        }

        TranslationConfig {
            target_lang: target_lang.to_string(),
            ..self.config.clone()
        }
    }

    fn find_config_file() -> Option<PathBuf> {
        constants::CONFIG_PATHS
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .find(|path| path.exists())
    }

    /// 从指定文件加载配置
    fn load_from_file(path: &Path) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::ConfigError(format!("读取配置文件失败 {}: {}", path.display(), e))
        })?;

        // 尝试TOML格式
        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }
}
