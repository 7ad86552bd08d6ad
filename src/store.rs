use std::collections::HashSet;
use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::Builder;
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::domain::{FetchedMeta, ImdbId};
use crate::error::MetaError;

/// The directory of `<id>.<extension>` meta files that acts as the local cache.
#[derive(Debug, Clone)]
pub struct MetaStore {
    cache_dir: Utf8PathBuf,
    extension: String,
}

impl MetaStore {
    pub fn new(data_dir: &Utf8Path, config: &SyncConfig) -> Self {
        Self::new_with_paths(data_dir.join(&config.cache_dir), &config.extension)
    }

    pub fn new_with_paths(cache_dir: Utf8PathBuf, extension: &str) -> Self {
        Self {
            cache_dir,
            extension: extension.to_string(),
        }
    }

    pub fn cache_dir(&self) -> &Utf8Path {
        &self.cache_dir
    }

    pub fn meta_path(&self, id: &ImdbId) -> Utf8PathBuf {
        self.cache_dir.join(format!("{id}.{}", self.extension))
    }

    pub fn ensure_cache_dir(&self) -> Result<(), MetaError> {
        fs::create_dir_all(self.cache_dir.as_std_path()).map_err(|err| MetaError::CacheWrite {
            path: self.cache_dir.clone(),
            message: err.to_string(),
        })
    }

    /// Base names of every entry in the cache directory, with the meta
    /// extension stripped where present.
    pub fn inventory(&self) -> Result<HashSet<String>, MetaError> {
        let read_err = |err: std::io::Error| MetaError::CacheRead {
            path: self.cache_dir.clone(),
            message: err.to_string(),
        };
        let suffix = format!(".{}", self.extension);

        let mut names = HashSet::new();
        for entry in fs::read_dir(self.cache_dir.as_std_path()).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let base = name.strip_suffix(suffix.as_str()).unwrap_or(&name);
            names.insert(base.to_string());
        }
        debug!(count = names.len(), dir = %self.cache_dir, "inventoried metas");
        Ok(names)
    }

    /// Writes the payload verbatim, owner read/write only, replacing any file
    /// already at the target path.
    pub fn write_meta(&self, meta: &FetchedMeta) -> Result<Utf8PathBuf, MetaError> {
        let path = self.meta_path(&meta.id);
        let write_err = |err: std::io::Error| MetaError::CacheWrite {
            path: path.clone(),
            message: err.to_string(),
        };

        let mut builder = Builder::new();
        builder.prefix(".metafetcher-").suffix(".tmp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o600));
        }
        let mut temp = builder
            .tempfile_in(self.cache_dir.as_std_path())
            .map_err(write_err)?;
        temp.write_all(meta.raw.as_bytes()).map_err(write_err)?;
        temp.flush().map_err(write_err)?;
        temp.persist(path.as_std_path())
            .map_err(|err| write_err(err.error))?;
        Ok(path)
    }

    /// Writes every payload in order; the first failure aborts the rest.
    pub fn write_metas(&self, metas: &[FetchedMeta]) -> Result<Vec<Utf8PathBuf>, MetaError> {
        let mut written = Vec::with_capacity(metas.len());
        for meta in metas {
            info!("Write meta file for {}", meta.id);
            written.push(self.write_meta(meta)?);
        }
        Ok(written)
    }
}

/// Identifiers from `ids` that are not in `cached`, in input order.
///
/// Duplicates in `ids` are kept.
pub fn resolve_missing(ids: &[ImdbId], cached: &HashSet<String>) -> Vec<ImdbId> {
    ids.iter()
        .filter(|id| !cached.contains(id.as_str()))
        .cloned()
        .collect()
}
