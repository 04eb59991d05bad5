//! 翻译能力抽象
//!
//! 上游翻译服务有时返回单条记录，有时返回记录列表（分块翻译时）。
//! `TranslationResponse` 在边界处把两种形态统一成一条 `TranslatedResult`，
//! 缓存和重试层只接触统一后的结果。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};

/// 单条翻译结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedResult {
    pub translated_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_source_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// 降级结果（原文），永不写入缓存
    #[serde(skip)]
    pub degraded: bool,
}

impl TranslatedResult {
    pub fn new<S: Into<String>>(translated_text: S) -> Self {
        Self {
            translated_text: translated_text.into(),
            detected_source_language: None,
            model: None,
            degraded: false,
        }
    }

    pub fn with_detected_language<S: Into<String>>(mut self, lang: S) -> Self {
        self.detected_source_language = Some(lang.into());
        self
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// 以原文作为降级结果
    pub fn untranslated<S: Into<String>>(original: S) -> Self {
        Self {
            degraded: true,
            ..Self::new(original)
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// 上游响应的两种形态
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TranslationResponse {
    Single(TranslatedResult),
    Batch(Vec<TranslatedResult>),
}

impl TranslationResponse {
    /// 归一化为一条结果
    ///
    /// 多条记录按顺序拼接译文，语言和模型取第一条。
    pub fn into_result(self) -> TranslationResult<TranslatedResult> {
        match self {
            TranslationResponse::Single(result) => Ok(result),
            TranslationResponse::Batch(results) => {
                let mut results = results.into_iter();
                let mut first = results.next().ok_or_else(|| {
                    TranslationError::TranslationServiceError("翻译服务返回了空结果".to_string())
                })?;

                for chunk in results {
                    first.translated_text.push_str(&chunk.translated_text);
                    first.degraded |= chunk.degraded;
                }

                Ok(first)
            }
        }
    }
}

impl From<TranslatedResult> for TranslationResponse {
    fn from(result: TranslatedResult) -> Self {
        TranslationResponse::Single(result)
    }
}

impl From<Vec<TranslatedResult>> for TranslationResponse {
    fn from(results: Vec<TranslatedResult>) -> Self {
        TranslationResponse::Batch(results)
    }
}

/// 翻译能力
pub trait Translator {
    fn translate(&self, text: &str) -> TranslationResult<TranslatedResult>;
}

impl<T: Translator + ?Sized> Translator for &T {
    fn translate(&self, text: &str) -> TranslationResult<TranslatedResult> {
        (**self).translate(text)
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(&self, text: &str) -> TranslationResult<TranslatedResult> {
        (**self).translate(text)
    }
}

impl<T: Translator + ?Sized> Translator for Arc<T> {
    fn translate(&self, text: &str) -> TranslationResult<TranslatedResult> {
        (**self).translate(text)
    }
}
