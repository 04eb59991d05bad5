//! 存储模块
//!
//! 提供按目标语言分区的持久化翻译缓存。

pub mod cache;

pub use cache::{cache_file_name, ensure_cache_dir, fingerprint, CacheStats, TranslationCache};
