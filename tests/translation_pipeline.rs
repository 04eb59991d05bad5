//! 翻译管道集成测试
//!
//! 从配置文件到本地化输出的完整流程

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use engageny_chef::core::{build_localizer, Localizer};
use engageny_chef::translation::config::{ConfigManager, FailurePolicy, TranslationConfig};
use engageny_chef::translation::core::{CachingClient, RetryConfig, RetryingTranslator};
use engageny_chef::translation::error::TranslationError;
use engageny_chef::translation::storage::CacheStats;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{
    CountingTranslator, FailingTranslator, FailureKind, RecordingSleeper, TestEnvironment,
};

#[test]
fn test_localizer_calls_upstream_once_per_text() {
    let env = TestEnvironment::new();
    let upstream = Arc::new(CountingTranslator::default());
    let sleeper = RecordingSleeper::default();

    let retrying =
        RetryingTranslator::with_sleeper(Arc::clone(&upstream), RetryConfig::default(), &sleeper);
    let mut localizer = Localizer::new(CachingClient::new(retrying, env.open_cache("es")));

    let titles = ["Grade 6 Mathematics", "Module 1", "Grade 6 Mathematics", "Module 1"];
    let localized: Vec<String> = titles
        .iter()
        .map(|title| localizer.localize(title).unwrap())
        .collect();

    assert_eq!(localized[0], "<es>Grade 6 Mathematics</es>");
    assert_eq!(localized[0], localized[2]);
    assert_eq!(upstream.calls(), 2);

    let stats = localizer.finish().unwrap();
    assert_eq!(stats, CacheStats { hits: 2, misses: 2 });
    assert!(sleeper.sleeps().is_empty());
}

#[test]
fn test_cached_translations_outlive_the_process_handle() {
    let env = TestEnvironment::new();

    let mut first = Localizer::new(CachingClient::new(
        CountingTranslator::default(),
        env.open_cache("es"),
    ));
    first.localize("Lesson 7").unwrap();
    first.finish().unwrap();

    let mut second = Localizer::new(CachingClient::new(
        FailingTranslator::always(FailureKind::Permanent),
        env.open_cache("es"),
    ));
    assert_eq!(second.localize("Lesson 7").unwrap(), "<es>Lesson 7</es>");
    assert_eq!(second.client().translator().calls(), 0);
}

#[test]
fn test_permanent_failure_names_the_failing_title() {
    let env = TestEnvironment::new();
    let sleeper = RecordingSleeper::default();
    let retrying = RetryingTranslator::with_sleeper(
        FailingTranslator::always(FailureKind::Permanent),
        RetryConfig::default(),
        &sleeper,
    );
    let mut localizer = Localizer::new(CachingClient::new(retrying, env.open_cache("es")));

    let error = localizer.localize("Grade 3 Module 4 Overview").unwrap_err();
    let message = error.to_string();
    assert!(message.contains("Grade 3 Module 4 Overview"));
    assert!(message.contains("Daily Limit Exceeded"));
    assert!(error.is_permanent());
    assert!(sleeper.sleeps().is_empty());
}

#[test]
fn test_cancel_flag_interrupts_retries() {
    let env = TestEnvironment::new();
    let flag = Arc::new(AtomicBool::new(true));
    let retrying = RetryingTranslator::with_sleeper(
        CountingTranslator::default(),
        RetryConfig::default(),
        RecordingSleeper::default(),
    )
    .with_cancel_flag(Arc::clone(&flag));
    let mut client = CachingClient::new(retrying, env.open_cache("es"));

    assert!(matches!(client.translate("Hello"), Err(TranslationError::Cancelled)));
    assert!(!client.cache().contains("Hello").unwrap());

    flag.store(false, std::sync::atomic::Ordering::SeqCst);
    assert!(client.translate("Hello").is_ok());
}

#[test]
fn test_same_language_pipeline_needs_no_network() {
    let env = TestEnvironment::new();
    let config = TranslationConfig {
        source_lang: "en".to_string(),
        target_lang: "en".to_string(),
        cache_dir: env.dir.path().to_string_lossy().into_owned(),
        ..TranslationConfig::default()
    };

    let mut localizer = build_localizer(&config).unwrap();
    assert_eq!(localizer.localize("Algebra I").unwrap(), "Algebra I");
    assert_eq!(localizer.localize("Algebra I").unwrap(), "Algebra I");

    let stats = localizer.finish().unwrap();
    assert_eq!(stats, CacheStats { hits: 1, misses: 1 });
}

#[test]
fn test_config_file_drives_the_pipeline() {
    let env = TestEnvironment::new();
    let path = env.dir.path().join("chef-config.toml");
    std::fs::write(
        &path,
        r#"
target_lang = "zh-cn"
max_tries = 2
retry_delay_secs = 5
failure_policy = "degrade"
"#,
    )
    .unwrap();

    let manager = ConfigManager::from_file(&path).unwrap();
    assert_eq!(manager.source(), Some(path.as_path()));

    let config = manager.get_config();
    assert_eq!(config.target_lang, "zh-cn");
    assert_eq!(config.failure_policy, FailurePolicy::Degrade);

    let retry = RetryConfig::from(config);
    let sleeper = RecordingSleeper::default();
    let retrying = RetryingTranslator::with_sleeper(
        FailingTranslator::always(FailureKind::Transient),
        retry,
        &sleeper,
    );
    let mut localizer = Localizer::new(CachingClient::new(retrying, env.open_cache("zh-cn")));

    assert_eq!(localizer.localize("Geometry").unwrap(), "Geometry");
    assert_eq!(sleeper.sleeps(), vec![std::time::Duration::from_secs(5)]);
}
