//! 翻译核心模块
//!
//! 各层通过 [`Translator`] 能力组合在一起：
//!
//! - **上游层** (`google.rs`): 调用 Google 翻译 REST 接口
//! - **重试层** (`retry.rs`): 有界重试，永久错误短路，失败时报错或降级
//! - **缓存层** (`client.rs`): 按原文指纹缓存成功结果
//! - **长度保护** (`guard.rs`): 超长文本在任何请求之前被拒绝或截断
//!
//! ```rust,no_run
//! use engageny_chef::translation::config::TranslationConfig;
//! use engageny_chef::translation::core::{
//!     CachingClient, GoogleTranslator, RetryConfig, RetryingTranslator,
//! };
//! use engageny_chef::translation::storage::TranslationCache;
//!
//! # fn example() -> engageny_chef::translation::TranslationResult<()> {
//! let config = TranslationConfig::default_with_lang("es");
//! let upstream = GoogleTranslator::new(&config)?;
//! let retrying = RetryingTranslator::new(upstream, RetryConfig::from(&config));
//! let cache = TranslationCache::open(config.cache_dir(), &config.target_lang)?;
//!
//! let mut client = CachingClient::new(retrying, cache);
//! let result = client.translate("Grade 3 Mathematics")?;
//! println!("{}", result.translated_text);
//! client.close()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod google;
pub mod guard;
pub mod retry;
pub mod translator;

pub use client::CachingClient;
pub use google::GoogleTranslator;
pub use guard::LengthGuard;
pub use retry::{RetryConfig, RetryStats, RetryingTranslator, Sleeper, ThreadSleeper};
pub use translator::{TranslatedResult, TranslationResponse, Translator};
