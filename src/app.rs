use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{discover_csv_files, extract_ids, read_rows};
use crate::cinemeta::MetaClient;
use crate::config::SyncConfig;
use crate::domain::{FetchOutcome, FetchedMeta, ImdbId, SkipReason};
use crate::error::MetaError;
use crate::fetch::{Fetcher, Throttle};
use crate::store::{MetaStore, resolve_missing};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub data_dir: String,
    pub cache_dir: String,
    pub files: Vec<FileReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub csv: String,
    pub identifiers: usize,
    pub missing: Vec<ImdbId>,
    pub written: Vec<ImdbId>,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub id: ImdbId,
    #[serde(flatten)]
    pub reason: SkipReason,
}

pub struct App<C: MetaClient, T: Throttle> {
    config: SyncConfig,
    fetcher: Fetcher<C, T>,
}

impl<C: MetaClient, T: Throttle> App<C, T> {
    pub fn new(config: SyncConfig, client: C, throttle: T) -> Self {
        let fetcher = Fetcher::new(client, throttle, config.delay);
        Self { config, fetcher }
    }

    /// Runs the pipeline once for every CSV file in `data_dir`, one file at a time.
    pub fn sync(&self, data_dir: &Utf8Path, options: SyncOptions) -> Result<SyncReport, MetaError> {
        let store = MetaStore::new(data_dir, &self.config);
        let csv_files = discover_csv_files(data_dir)?;
        debug!(count = csv_files.len(), dir = %data_dir, "discovered CSV files");
        if !options.dry_run {
            store.ensure_cache_dir()?;
        }

        let mut files = Vec::with_capacity(csv_files.len());
        for csv in &csv_files {
            files.push(self.sync_file(csv, &store, options)?);
        }

        Ok(SyncReport {
            data_dir: data_dir.to_string(),
            cache_dir: store.cache_dir().to_string(),
            files,
        })
    }

    pub fn sync_file(
        &self,
        csv: &Utf8Path,
        store: &MetaStore,
        options: SyncOptions,
    ) -> Result<FileReport, MetaError> {
        info!("Processing {csv}");
        let rows = read_rows(csv)?;
        let ids = extract_ids(&rows, &self.config.id_column)?;

        // Inventory is taken per file so metas written for earlier files count.
        let cached = if store.cache_dir().as_std_path().exists() {
            store.inventory()?
        } else if options.dry_run {
            Default::default()
        } else {
            store.ensure_cache_dir()?;
            store.inventory()?
        };
        let missing = resolve_missing(&ids, &cached);
        debug!(
            identifiers = ids.len(),
            cached = cached.len(),
            missing = missing.len(),
            "resolved missing metas"
        );

        let mut report = FileReport {
            csv: csv.to_string(),
            identifiers: ids.len(),
            missing: missing.clone(),
            written: Vec::new(),
            skipped: Vec::new(),
        };
        if options.dry_run {
            for id in &missing {
                info!("Missing meta for {id}");
            }
            return Ok(report);
        }

        let mut fetched: Vec<FetchedMeta> = Vec::new();
        for outcome in self.fetcher.fetch_all(&missing) {
            match outcome {
                FetchOutcome::Fetched(meta) => fetched.push(meta),
                FetchOutcome::Skipped { id, reason } => {
                    report.skipped.push(SkippedItem { id, reason })
                }
            }
        }

        store.write_metas(&fetched)?;
        report.written = fetched.into_iter().map(|meta| meta.id).collect();
        Ok(report)
    }
}

/// Trims trailing slashes from a user-supplied data directory, keeping a bare root.
pub fn normalize_data_dir(raw: &str) -> Utf8PathBuf {
    let trimmed = raw.trim_end_matches('/');
    match (trimmed.is_empty(), raw.is_empty()) {
        (true, true) => Utf8PathBuf::from("."),
        (true, false) => Utf8PathBuf::from("/"),
        (false, _) => Utf8PathBuf::from(trimmed),
    }
}
