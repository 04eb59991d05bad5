//! Google Cloud Translation (v2 REST) 客户端
//!
//! 同步阻塞实现。源语言与目标语言相同时不发起网络请求，直接返回原文。

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use super::translator::{TranslatedResult, TranslationResponse, Translator};
use crate::translation::config::TranslationConfig;
use crate::translation::error::{TranslationError, TranslationResult};

const NOP_MODEL: &str = "nop";

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a [&'a str],
    target: &'a str,
    source: &'a str,
    format: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateEnvelope {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<TranslatedResult>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Google 翻译客户端
pub struct GoogleTranslator {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    source_lang: String,
    target_lang: String,
    format: String,
    model: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslationConfig) -> TranslationResult<Self> {
        let endpoint = Url::parse(&config.api_url).map_err(|e| {
            TranslationError::ConfigError(format!("无效的API URL {}: {}", config.api_url, e))
        })?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
            format: config.format.clone(),
            model: config.model.clone(),
        })
    }

    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    /// 源语言与目标语言相同，无需翻译
    pub fn is_nop(&self) -> bool {
        self.source_lang == self.target_lang
    }

    /// 一次请求翻译多段文本，结果与输入顺序一致
    pub fn translate_values(&self, values: &[&str]) -> TranslationResult<Vec<TranslatedResult>> {
        if values.is_empty() {
            return Ok(Vec::new());
        }

        if self.is_nop() {
            return Ok(values
                .iter()
                .map(|value| {
                    TranslatedResult::new(*value)
                        .with_detected_language(self.source_lang.as_str())
                        .with_model(NOP_MODEL)
                })
                .collect());
        }

        let request = TranslateRequest {
            q: values,
            target: &self.target_lang,
            source: &self.source_lang,
            format: &self.format,
            model: &self.model,
        };

        let mut builder = self.client.post(self.endpoint.clone()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.query(&[("key", key.as_str())]);
        }

        tracing::debug!("请求翻译 {} 段文本 -> {}", values.len(), self.target_lang);
        let response = builder.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let translations = parse_translations(&body)?;
        if translations.len() != values.len() {
            return Err(TranslationError::TranslationServiceError(format!(
                "翻译结果数量不匹配: 期望 {}, 实际 {}",
                values.len(),
                translations.len()
            )));
        }

        Ok(translations)
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str) -> TranslationResult<TranslatedResult> {
        let translations = self.translate_values(&[text])?;
        TranslationResponse::from(translations).into_result()
    }
}

/// 解析成功响应中的翻译列表
fn parse_translations(body: &str) -> TranslationResult<Vec<TranslatedResult>> {
    let envelope: TranslateEnvelope = serde_json::from_str(body)?;
    Ok(envelope.data.translations)
}

/// 按HTTP状态码划分错误类别
fn classify_failure(status: StatusCode, body: &str) -> TranslationError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let message = format!("HTTP {}: {}", status.as_u16(), message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TranslationError::Forbidden(message),
        StatusCode::TOO_MANY_REQUESTS => TranslationError::RateLimitExceeded,
        _ => TranslationError::TranslationServiceError(message),
    }
}
