use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::error::Result;
use crate::model::config::{format_timestamp, SyncConfig};
use crate::model::dictionary::{Dictionary, KeyPolicy};
use crate::parsers::word_list;
use crate::services::fetch::RemoteSource;
use crate::services::{config_store, merge, serializer};

pub struct SyncOptions {
    pub config_path: PathBuf,
    pub output_path: PathBuf,
    pub dict_name: String,
    pub key_policy: KeyPolicy,
    /// Fetch everything regardless of freshness and log duplicates.
    pub diagnostic: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub merged_files: usize,
    pub failed: Vec<String>,
    pub duplicates: usize,
    pub entries: usize,
    pub written: bool,
}

/// Whether a file has to be downloaded this run.
///
/// Diagnostic runs always fetch. Otherwise a file is fetched only when its
/// remote time is known and either nothing was recorded yet or the remote
/// time is strictly newer; every other case skips.
pub fn should_fetch(
    diagnostic: bool,
    remote: Option<DateTime<Utc>>,
    last_update: Option<DateTime<Utc>>,
) -> bool {
    if diagnostic {
        return true;
    }

    match (remote, last_update) {
        (Some(_), None) => true,
        (Some(remote), Some(local)) => remote > local,
        (None, _) => false,
    }
}

/// Walks every configured file in order, merging whatever was fetched.
///
/// `config` is updated in place with the new `last_update` times; nothing
/// is written to disk here.
pub fn sync_sources(
    config: &mut SyncConfig,
    source: &dyn RemoteSource,
    policy: KeyPolicy,
    diagnostic: bool,
) -> (Dictionary, SyncReport) {
    let mut words = Dictionary::new();
    let mut report = SyncReport::default();

    for repo_config in config.repositories.iter_mut() {
        let (Some(repo), Some(file_paths)) = (&repo_config.repo_url, &repo_config.file_paths)
        else {
            tracing::warn!("Skipping repository entry without repo_url or file_paths");
            continue;
        };

        // decisions compare against the time recorded before this run
        let recorded = repo_config.last_update;
        let mut newest_fetched: Option<DateTime<Utc>> = None;

        for file_path in file_paths {
            let remote_time = match source.last_modified(repo, file_path) {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::debug!(repo = %repo, path = %file_path, error = %e, "Remote time unavailable");
                    None
                }
            };

            if diagnostic {
                tracing::info!(
                    repo = %repo,
                    path = %file_path,
                    remote = ?remote_time.as_ref().map(format_timestamp),
                    local = ?recorded.as_ref().map(format_timestamp),
                    "Checking file"
                );
            }

            if !should_fetch(diagnostic, remote_time, recorded) {
                tracing::debug!(repo = %repo, path = %file_path, "Up to date, skipping");
                continue;
            }

            let from = format!("{repo}/{file_path}");
            let content = match source.fetch(repo, file_path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(source = %from, error = %e, "File download failed");
                    report.failed.push(from);
                    continue;
                }
            };

            let new_words = word_list::extract(&content, policy);
            tracing::debug!(source = %from, entries = new_words.len(), "Extracted entries");

            report.duplicates += merge::merge_words(&mut words, new_words, &from, diagnostic);
            report.merged_files += 1;

            if let Some(t) = remote_time {
                newest_fetched = newest_fetched.max(Some(t));
            }
        }

        if let Some(t) = newest_fetched {
            repo_config.last_update = Some(t);
        }
    }

    report.entries = words.len();
    (words, report)
}

/// One full sync: load config, fetch and merge, then persist if anything changed.
pub fn run(source: &dyn RemoteSource, opts: &SyncOptions) -> Result<SyncReport> {
    run_at(source, opts, Local::now().date_naive())
}

/// [`run`] with an explicit generation date for the output header.
pub fn run_at(source: &dyn RemoteSource, opts: &SyncOptions, today: NaiveDate) -> Result<SyncReport> {
    let mut config = config_store::load(&opts.config_path)?;
    tracing::debug!(
        path = %opts.config_path.display(),
        repositories = config.repositories.len(),
        "Config loaded"
    );

    let (words, mut report) = sync_sources(&mut config, source, opts.key_policy, opts.diagnostic);

    if report.merged_files == 0 {
        tracing::info!(failed = report.failed.len(), "No update needed");
        return Ok(report);
    }

    serializer::save(&opts.output_path, &words, &opts.dict_name, today)?;
    config_store::save(&opts.config_path, &config)?;
    report.written = true;

    tracing::info!(
        files = report.merged_files,
        entries = report.entries,
        duplicates = report.duplicates,
        failed = report.failed.len(),
        "Dictionary updated"
    );

    Ok(report)
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
