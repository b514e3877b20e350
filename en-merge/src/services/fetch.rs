use std::path::{Path, PathBuf};
use std::{thread, time::Duration};

use chrono::{DateTime, Utc};
use rand::{thread_rng, Rng};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{Result, SyncError};
use crate::services::encoding::decode_text;
use crate::services::storage::write_atomic;

/// Where upstream word lists come from.
pub trait RemoteSource {
    /// Commit time of the newest change to `path` in `repo`.
    fn last_modified(&self, repo: &str, path: &str) -> Result<DateTime<Utc>>;

    /// Current text of `path` on the repository's default branch.
    fn fetch(&self, repo: &str, path: &str) -> Result<String>;
}

const API_BASE: &str = "https://api.github.com";
const RAW_BASE: &str = "https://raw.githubusercontent.com";
const FALLBACK_BRANCH: &str = "main";

const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 800;

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let ms = BASE_DELAY_MS * (2_u64.pow(attempt as u32)) + jitter;
    Duration::from_millis(ms)
}

fn should_retry_http(status: StatusCode) -> bool {
    // 408/429/5xx are usually transient
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

#[derive(Debug, Deserialize)]
struct CommitItem {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: Option<String>,
}

/// Committer date of the first (newest) commit in a `/commits` listing.
fn latest_commit_time(body: &str) -> Option<DateTime<Utc>> {
    let commits: Vec<CommitItem> = serde_json::from_str(body).ok()?;
    commits
        .into_iter()
        .next()
        .and_then(|c| c.commit.committer)
        .map(|s| s.date)
}

/// `{cache_dir}/{repository name}/{file base name}`
pub fn cache_path(cache_dir: &Path, repo: &str, path: &str) -> PathBuf {
    let repo_name = repo.trim_end_matches('/').rsplit('/').next().unwrap_or(repo);
    let base_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    cache_dir.join(repo_name).join(base_name)
}

/// GitHub-backed [`RemoteSource`] over a blocking client.
pub struct GithubSource {
    client: Client,
    cache_dir: PathBuf,
}

impl GithubSource {
    pub fn new(cache_dir: PathBuf, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("en-merge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, cache_dir })
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let mut attempt = 0usize;

        loop {
            let res = self.client.get(url).query(query).send();

            let retryable = match &res {
                Ok(resp) => should_retry_http(resp.status()),
                Err(err) => err.is_timeout() || err.is_connect(),
            };
            if retryable && attempt + 1 < MAX_RETRIES {
                tracing::debug!(url, attempt, "Request failed, retrying");
                thread::sleep(backoff(attempt));
                attempt += 1;
                continue;
            }

            let resp = res?;
            let status = resp.status();
            if !status.is_success() {
                return Err(SyncError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            return Ok(resp);
        }
    }

    fn default_branch(&self, repo: &str) -> String {
        let url = format!("{API_BASE}/repos/{repo}");

        let branch = self
            .get(&url, &[])
            .and_then(|resp| Ok(resp.json::<RepoInfo>()?))
            .map(|info| info.default_branch);

        match branch {
            Ok(Some(b)) if !b.trim().is_empty() => b,
            Ok(_) => FALLBACK_BRANCH.to_string(),
            Err(e) => {
                tracing::debug!(repo, error = %e, "Default branch lookup failed, using fallback");
                FALLBACK_BRANCH.to_string()
            }
        }
    }

    fn write_cache(&self, repo: &str, path: &str, text: &str) {
        let target = cache_path(&self.cache_dir, repo, path);
        match write_atomic(&target, text.as_bytes()) {
            Ok(()) => tracing::debug!(path = %target.display(), "Cached upstream file"),
            Err(e) => tracing::warn!(error = %e, "Failed to cache upstream file"),
        }
    }
}

impl RemoteSource for GithubSource {
    fn last_modified(&self, repo: &str, path: &str) -> Result<DateTime<Utc>> {
        let url = format!("{API_BASE}/repos/{repo}/commits");
        let body = self.get(&url, &[("path", path)])?.text()?;

        latest_commit_time(&body).ok_or_else(|| SyncError::TimestampUnavailable {
            repo: repo.to_string(),
            path: path.to_string(),
        })
    }

    fn fetch(&self, repo: &str, path: &str) -> Result<String> {
        let branch = self.default_branch(repo);
        let url = format!("{RAW_BASE}/{repo}/{branch}/{path}");

        let bytes = self.get(&url, &[])?.bytes()?;
        let (text, encoding) = decode_text(&bytes);
        tracing::debug!(url = %url, encoding = encoding.name(), bytes = bytes.len(), "Downloaded");

        if text.is_empty() {
            return Err(SyncError::EmptyContent { url });
        }

        self.write_cache(repo, path, &text);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn newest_commit_date_is_used() {
        let body = r#"[
            {"sha":"b","commit":{"committer":{"name":"x","date":"2024-06-02T08:00:00Z"}}},
            {"sha":"a","commit":{"committer":{"name":"x","date":"2024-01-01T00:00:00Z"}}}
        ]"#;
        assert_eq!(
            latest_commit_time(body),
            Some(Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn no_commits_means_no_time() {
        assert_eq!(latest_commit_time("[]"), None);
        assert_eq!(latest_commit_time(r#"{"message":"Not Found"}"#), None);
        assert_eq!(latest_commit_time(r#"[{"commit":{"committer":null}}]"#), None);
    }

    #[test]
    fn cache_path_uses_repo_name_and_file_base_name() {
        let p = cache_path(Path::new("en_dicts"), "iDvel/rime-ice", "en_dicts/en.dict.yaml");
        assert_eq!(p, Path::new("en_dicts").join("rime-ice").join("en.dict.yaml"));
    }

    #[test]
    fn retry_only_transient_statuses() {
        assert!(should_retry_http(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry_http(StatusCode::BAD_GATEWAY));
        assert!(!should_retry_http(StatusCode::NOT_FOUND));
        assert!(!should_retry_http(StatusCode::FORBIDDEN));
    }
}
