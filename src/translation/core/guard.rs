//! 文本长度保护
//!
//! 在任何网络请求和指纹计算之前检查文本长度。

use std::borrow::Cow;

use crate::translation::config::{constants, LengthPolicy};
use crate::translation::error::{TranslationError, TranslationResult};

/// 按字符数限制请求文本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthGuard {
    pub max_chars: usize,
    pub policy: LengthPolicy,
}

impl Default for LengthGuard {
    fn default() -> Self {
        Self {
            max_chars: constants::MAX_TEXT_LENGTH,
            policy: LengthPolicy::Reject,
        }
    }
}

impl LengthGuard {
    pub fn new(max_chars: usize, policy: LengthPolicy) -> Self {
        Self { max_chars, policy }
    }

    pub fn apply<'a>(&self, text: &'a str) -> TranslationResult<Cow<'a, str>> {
        // 字节数不超过上限时字符数必然不超过
        if text.len() <= self.max_chars {
            return Ok(Cow::Borrowed(text));
        }

        let length = text.chars().count();
        if length <= self.max_chars {
            return Ok(Cow::Borrowed(text));
        }

        match self.policy {
            LengthPolicy::Reject => Err(TranslationError::InputTooLong {
                length,
                max: self.max_chars,
            }),
            LengthPolicy::Truncate => {
                tracing::warn!(
                    "文本长度 {} 超过翻译服务上限 {}，已截断",
                    length,
                    self.max_chars
                );
                let end = text
                    .char_indices()
                    .nth(self.max_chars)
                    .map(|(index, _)| index)
                    .unwrap_or(text.len());
                Ok(Cow::Borrowed(&text[..end]))
            }
        }
    }
}
