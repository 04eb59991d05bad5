use crate::env::{core::NoColor, EnvVar};
use crate::translation::config::TranslationConfig;
use crate::translation::core::retry::preview;
use crate::translation::core::{
    CachingClient, GoogleTranslator, LengthGuard, RetryConfig, RetryingTranslator, Translator,
};
use crate::translation::error::helpers::{config_error, log_error};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::storage::{ensure_cache_dir, CacheStats, TranslationCache};

/// Languages the chef publishes channels in
pub const SUPPORTED_LANGUAGES: &[&str] = &["ar", "bn", "en", "es", "zh-cn", "zh-tw"];

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Lowercases a requested language and checks it against [`SUPPORTED_LANGUAGES`]
pub fn normalize_language(lang: Option<&str>) -> TranslationResult<String> {
    let supported = SUPPORTED_LANGUAGES.join(", ");

    let lang = match lang.map(str::trim) {
        Some(lang) if !lang.is_empty() => lang.to_lowercase(),
        _ => {
            return Err(config_error(format!(
                "Language is required, choose one of: {}",
                supported
            )))
        }
    };

    if SUPPORTED_LANGUAGES.contains(&lang.as_str()) {
        Ok(lang)
    } else {
        Err(config_error(format!(
            "Language '{}' is not supported, choose one of: {}",
            lang, supported
        )))
    }
}

/// Translates user-facing strings (titles, descriptions) for one target language
pub struct Localizer<T> {
    client: CachingClient<T>,
}

impl<T: Translator> Localizer<T> {
    pub fn new(client: CachingClient<T>) -> Self {
        Self { client }
    }

    /// Errors carry the start of `msg` so the failing title can be found in the logs
    pub fn localize(&mut self, msg: &str) -> TranslationResult<String> {
        let result = match self.client.translate(msg) {
            Ok(result) => result,
            Err(TranslationError::Cancelled) => return Err(TranslationError::Cancelled),
            Err(error) => {
                return log_error(TranslationError::TextFailed {
                    text: preview(msg),
                    source: Box::new(error),
                })
            }
        };
        tracing::debug!(?result, "localized");
        Ok(result.translated_text)
    }

    pub fn lang(&self) -> &str {
        self.client.cache().lang()
    }

    pub fn stats(&self) -> CacheStats {
        self.client.stats()
    }

    pub fn client(&self) -> &CachingClient<T> {
        &self.client
    }

    /// Logs final cache statistics and releases the cache
    pub fn finish(&mut self) -> TranslationResult<CacheStats> {
        let stats = self.client.stats();
        tracing::info!(
            lang = self.lang(),
            hits = stats.hits,
            misses = stats.misses,
            "translation cache stats, hit rate {:.1}%",
            stats.hit_rate() * 100.0
        );
        self.client.close()?;
        Ok(stats)
    }
}

/// Wires the upstream client, retry wrapper, length guard and cache together
pub fn build_localizer(
    config: &TranslationConfig,
) -> TranslationResult<Localizer<RetryingTranslator<GoogleTranslator>>> {
    let lang = normalize_language(Some(&config.target_lang))?;
    let guard = LengthGuard::new(config.max_text_length, config.length_policy);

    let upstream = GoogleTranslator::new(config)?;
    let retrying = RetryingTranslator::new(upstream, RetryConfig::from(config)).with_guard(guard);

    let cache_dir = config.cache_dir();
    ensure_cache_dir(&cache_dir)?;
    let cache = TranslationCache::open(&cache_dir, &lang)?;

    Ok(Localizer::new(CachingClient::new(retrying, cache).with_guard(guard)))
}

/// Removes cached translations, keyed the same way [`build_localizer`] stores them
///
/// Texts go through the configured [`LengthGuard`] first, so a title that was
/// truncated on the way in is found again. Stops at the first failure.
pub fn forget_translations(config: &TranslationConfig, texts: &[String]) -> TranslationResult<()> {
    let lang = normalize_language(Some(&config.target_lang))?;
    let guard = LengthGuard::new(config.max_text_length, config.length_policy);

    let cache_dir = config.cache_dir();
    ensure_cache_dir(&cache_dir)?;
    let mut cache = TranslationCache::open(&cache_dir, &lang)?;

    let outcome = texts.iter().try_for_each(|text| -> TranslationResult<()> {
        let key = guard.apply(text)?;
        cache.remove(&key)?;
        tracing::info!("已删除缓存条目: {}", preview(text));
        Ok(())
    });
    cache.close()?;

    outcome
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    if NoColor::get().unwrap_or(false) {
        eprintln!("{msg}");
    } else {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    }
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::config::LengthPolicy;
    use crate::translation::core::TranslatedResult;

    struct Upper;

    impl Translator for Upper {
        fn translate(&self, text: &str) -> TranslationResult<TranslatedResult> {
            Ok(TranslatedResult::new(text.to_uppercase()))
        }
    }

    #[test]
    fn test_normalize_language_lowercases() {
        assert_eq!(normalize_language(Some("ES")).unwrap(), "es");
        assert_eq!(normalize_language(Some("zh-CN")).unwrap(), "zh-cn");
    }

    #[test]
    fn test_normalize_language_rejects_missing_and_unknown() {
        assert!(normalize_language(None).is_err());
        assert!(normalize_language(Some("  ")).is_err());

        let error = normalize_language(Some("fr")).unwrap_err();
        assert!(error.to_string().contains("zh-tw"));
    }

    #[test]
    fn test_localize_and_finish() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TranslationCache::open(dir.path(), "es").unwrap();
        let mut localizer = Localizer::new(CachingClient::new(Upper, cache));

        assert_eq!(localizer.localize("unit 1").unwrap(), "UNIT 1");
        assert_eq!(localizer.localize("unit 1").unwrap(), "UNIT 1");
        assert_eq!(localizer.lang(), "es");

        let stats = localizer.finish().unwrap();
        assert_eq!(stats, CacheStats { hits: 1, misses: 1 });
        assert!(localizer.client().cache().is_closed());
    }

    struct Refusing;

    impl Translator for Refusing {
        fn translate(&self, _text: &str) -> TranslationResult<TranslatedResult> {
            Err(TranslationError::Forbidden("HTTP 403".to_string()))
        }
    }

    #[test]
    fn test_localize_error_names_the_text() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TranslationCache::open(dir.path(), "es").unwrap();
        let mut localizer = Localizer::new(CachingClient::new(Refusing, cache));

        let error = localizer.localize("Grade 5 Module 2 Lesson 7").unwrap_err();
        assert!(matches!(error, TranslationError::TextFailed { .. }));
        assert!(error.to_string().contains("Grade 5 Module 2 Lesson 7"));
        assert!(error.is_permanent());
    }

    #[test]
    fn test_build_localizer_creates_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("nested").join("cache");
        let config = TranslationConfig {
            source_lang: "en".to_string(),
            target_lang: "en".to_string(),
            cache_dir: cache_dir.to_string_lossy().into_owned(),
            ..TranslationConfig::default()
        };

        let mut localizer = build_localizer(&config).unwrap();
        assert_eq!(localizer.localize("Kindergarten").unwrap(), "Kindergarten");
        localizer.finish().unwrap();

        assert!(cache_dir.join("translation-cache-en").exists());
    }

    #[test]
    fn test_forget_finds_truncated_entries() {
        let dir = tempfile::tempdir().unwrap();
        let config = TranslationConfig {
            source_lang: "en".to_string(),
            target_lang: "en".to_string(),
            cache_dir: dir.path().to_string_lossy().into_owned(),
            max_text_length: 5,
            length_policy: LengthPolicy::Truncate,
            ..TranslationConfig::default()
        };

        let mut localizer = build_localizer(&config).unwrap();
        assert_eq!(localizer.localize("Kindergarten").unwrap(), "Kinde");
        localizer.finish().unwrap();

        forget_translations(&config, &["Kindergarten".to_string()]).unwrap();

        let cache = TranslationCache::open(dir.path(), "en").unwrap();
        assert!(!cache.contains("Kinde").unwrap());
    }

    #[test]
    fn test_forget_missing_text_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = TranslationConfig {
            source_lang: "en".to_string(),
            target_lang: "en".to_string(),
            cache_dir: dir.path().to_string_lossy().into_owned(),
            ..TranslationConfig::default()
        };

        let error = forget_translations(&config, &["Grade 9".to_string()]).unwrap_err();
        assert!(matches!(error, TranslationError::NotFound(_)));
    }

    #[test]
    fn test_build_localizer_rejects_unsupported_language() {
        let config = TranslationConfig::default_with_lang("fr");
        assert!(matches!(
            build_localizer(&config),
            Err(TranslationError::ConfigError(_))
        ));
    }
}
