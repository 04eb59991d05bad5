//! 带缓存的翻译客户端
//!
//! 先按原文指纹查询缓存，未命中时才调用内部翻译器，并把成功结果写回缓存。
//! 失败和降级结果都不会写入缓存，下次调用仍会重新请求上游。

use super::guard::LengthGuard;
use super::translator::{TranslatedResult, Translator};
use crate::translation::error::TranslationResult;
use crate::translation::storage::{CacheStats, TranslationCache};

/// 带缓存的翻译客户端
pub struct CachingClient<T> {
    translator: T,
    cache: TranslationCache,
    guard: Option<LengthGuard>,
}

impl<T: Translator> CachingClient<T> {
    pub fn new(translator: T, cache: TranslationCache) -> Self {
        Self {
            translator,
            cache,
            guard: None,
        }
    }

    /// 在计算指纹之前先检查文本长度
    pub fn with_guard(mut self, guard: LengthGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn translate(&mut self, text: &str) -> TranslationResult<TranslatedResult> {
        let text = match &self.guard {
            Some(guard) => guard.apply(text)?,
            None => text.into(),
        };

        if let Some(cached) = self.cache.get::<TranslatedResult>(&text)? {
            tracing::debug!("翻译缓存命中: {}", cached.translated_text);
            return Ok(cached);
        }

        let result = self.translator.translate(&text)?;
        if result.is_degraded() {
            tracing::debug!("降级结果不写入缓存");
        } else {
            self.cache.add(&text, &result)?;
        }

        Ok(result)
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn close(&mut self) -> TranslationResult<()> {
        self.cache.close()
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TranslationCache {
        &mut self.cache
    }
}
