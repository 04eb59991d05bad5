//! 持久化翻译缓存
//!
//! 以原文的 SHA-256 指纹为键，把翻译结果保存在 redb 数据库中。
//! 每个目标语言对应一个独立的数据库文件 `translation-cache-<lang>`。
//! 同一文件只允许一个句柄打开（redb 的文件锁保证单写者）。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use redb::{Database, ReadableTableMetadata, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::translation::config::constants::CACHE_FILE_PREFIX;
use crate::translation::error::helpers::cache_error;
use crate::translation::error::{TranslationError, TranslationResult};

const TRANSLATIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("translations");

/// 缓存统计信息
///
/// 仅在内存中计数，随进程重启清零。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// 计算缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// 查询总次数
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}

/// 计算文本指纹：UTF-8 字节的 SHA-256，小写十六进制
pub fn fingerprint(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// 指定语言的缓存文件名
pub fn cache_file_name(lang: &str) -> String {
    format!("{}{}", CACHE_FILE_PREFIX, lang)
}

/// 翻译缓存
pub struct TranslationCache {
    db: Option<Database>,
    path: PathBuf,
    lang: String,
    stats: CacheStats,
}

impl TranslationCache {
    /// 打开（或创建）`base_dir` 下指定语言的缓存
    pub fn open<P: AsRef<Path>>(base_dir: P, lang: &str) -> TranslationResult<Self> {
        let base_dir = base_dir.as_ref();
        if !base_dir.is_dir() {
            return Err(TranslationError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("缓存目录不存在: {}", base_dir.display()),
            )));
        }

        let path = base_dir.join(cache_file_name(lang));
        let db = Database::create(&path)?;

        // 预先建表，之后的只读事务无需处理表不存在的情况
        let txn = db.begin_write()?;
        txn.open_table(TRANSLATIONS)?;
        txn.commit()?;

        tracing::info!("打开翻译缓存: {}", path.display());

        Ok(Self {
            db: Some(db),
            path,
            lang: lang.to_string(),
            stats: CacheStats::default(),
        })
    }

    /// 写入缓存条目，已存在时覆盖
    pub fn add<V: Serialize + ?Sized>(&mut self, key: &str, value: &V) -> TranslationResult<()> {
        let db = self.db()?;
        let fingerprint = fingerprint(key);
        let bytes = serde_json::to_vec(value)?;

        let txn = db.begin_write()?;
        {
            let mut table = txn.open_table(TRANSLATIONS)?;
            table.insert(fingerprint.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;

        Ok(())
    }

    /// 读取缓存条目，命中与未命中分别计数
    pub fn get<V: DeserializeOwned>(&mut self, key: &str) -> TranslationResult<Option<V>> {
        let fingerprint = fingerprint(key);
        let bytes = {
            let db = self.db()?;
            let txn = db.begin_read()?;
            let table = txn.open_table(TRANSLATIONS)?;
            let guard = table.get(fingerprint.as_str())?;
            guard.map(|value| value.value().to_vec())
        };

        match bytes {
            Some(bytes) => {
                self.stats.hits += 1;
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| cache_error(format!("缓存条目损坏 {}: {}", fingerprint, e)))?;
                Ok(Some(value))
            }
            None => {
                self.stats.misses += 1;
                Ok(None)
            }
        }
    }

    /// 检查是否包含指定键（不影响统计）
    pub fn contains(&self, key: &str) -> TranslationResult<bool> {
        let db = self.db()?;
        let txn = db.begin_read()?;
        let table = txn.open_table(TRANSLATIONS)?;
        let found = table.get(fingerprint(key).as_str())?.is_some();
        Ok(found)
    }

    /// 删除缓存条目，键不存在时返回 `NotFound`
    pub fn remove(&mut self, key: &str) -> TranslationResult<()> {
        let db = self.db()?;
        let fingerprint = fingerprint(key);

        let txn = db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(TRANSLATIONS)?;
            let previous = table.remove(fingerprint.as_str())?;
            previous.is_some()
        };

        if !removed {
            txn.abort()?;
            return Err(TranslationError::NotFound(fingerprint));
        }

        txn.commit()?;
        Ok(())
    }

    /// 缓存条目数量
    pub fn len(&self) -> TranslationResult<u64> {
        let db = self.db()?;
        let txn = db.begin_read()?;
        let table = txn.open_table(TRANSLATIONS)?;
        Ok(table.len()?)
    }

    pub fn is_empty(&self) -> TranslationResult<bool> {
        Ok(self.len()? == 0)
    }

    /// 获取统计信息
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn is_closed(&self) -> bool {
        self.db.is_none()
    }

    /// 关闭缓存并释放文件锁，重复调用不做任何事
    pub fn close(&mut self) -> TranslationResult<()> {
        match self.db.take() {
            Some(db) => {
                drop(db);
                tracing::info!(
                    "关闭翻译缓存 {}: 命中 {}, 未命中 {}",
                    self.path.display(),
                    self.stats.hits,
                    self.stats.misses
                );
            }
            None => tracing::debug!("翻译缓存已关闭: {}", self.path.display()),
        }
        Ok(())
    }

    fn db(&self) -> TranslationResult<&Database> {
        self.db.as_ref().ok_or(TranslationError::CacheClosed)
    }
}

/// 确保缓存目录存在
pub fn ensure_cache_dir<P: AsRef<Path>>(base_dir: P) -> TranslationResult<()> {
    fs::create_dir_all(base_dir.as_ref())?;
    Ok(())
}
