//! # EngageNY Chef 翻译层
//!
//! 为内容抓取流程提供带持久化缓存的翻译服务。
//!
//! ## 模块组织
//!
//! - `core` - 面向抓取流程的本地化入口
//! - `translation` - 翻译能力、重试、缓存
//! - `env` - 类型化的环境变量

pub mod core;
pub mod env;
pub mod translation;

pub use self::core::{
    build_localizer, forget_translations, normalize_language, Localizer, SUPPORTED_LANGUAGES,
};
