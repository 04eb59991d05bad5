//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, FailurePolicy, LengthPolicy, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 上游服务限制
    pub const MAX_TEXT_LENGTH: usize = 5000;

    // 重试设置
    pub const DEFAULT_MAX_TRIES: u32 = 4;
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(100);
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    // 默认API设置
    pub const DEFAULT_API_URL: &str = "https://translation.googleapis.com/language/translate/v2";
    pub const DEFAULT_SOURCE_LANG: &str = "en";
    pub const DEFAULT_TARGET_LANG: &str = "es";
    pub const DEFAULT_FORMAT: &str = "text";
    pub const DEFAULT_MODEL: &str = "nmt";

    // 缓存设置
    pub const CACHE_FILE_PREFIX: &str = "translation-cache-";
    pub const DEFAULT_CACHE_DIR: &str = ".translation-cache";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "chef-config.toml",
        ".chef-config.toml",
        "~/.config/engageny-chef/config.toml",
        "/etc/engageny-chef/config.toml",
    ];
}
