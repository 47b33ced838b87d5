//! Integration tests for package installation.
//!
//! These tests drive the full install flow against an in-memory mirror:
//! - First install and the exact URLs it fetches
//! - Re-running as a repair (only stale files are fetched)
//! - Cancellation never exposing a partial file
//! - Pruning of non-package files
//! - Progress ordering
//!
//! Run with: `cargo test --test install_workflow`

mod common;

use std::fs;
use std::io::{self, Cursor, Read};

use cloudpkg::manager::{
    FetchResponse, FixedBufferSize, InstallOptions, ManagerConfig, ManagerError, ManagerResult,
    MemoryFetcher, PackageFetcher, PackageInstaller, PackageManager, COMPLETE_PERCENT,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use common::{payload, publish, staging_leftovers, write_file, Recorder, MIRROR};

// ============================================================================
// Helpers
// ============================================================================

fn manager(fetcher: &MemoryFetcher) -> PackageManager<MemoryFetcher> {
    PackageManager::new(
        fetcher.clone(),
        ManagerConfig::default().with_buffer_size(4096),
    )
}

/// Body that cancels a token as soon as the first chunk has been read.
struct CancelOnRead {
    inner: Cursor<Vec<u8>>,
    token: CancellationToken,
}

impl Read for CancelOnRead {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.token.cancel();
        Ok(n)
    }
}

/// Serves `inner`, but the body of `target` cancels `token` mid-transfer.
struct CancellingFetcher {
    inner: MemoryFetcher,
    target: String,
    token: CancellationToken,
}

impl PackageFetcher for CancellingFetcher {
    fn fetch(&self, url: &str) -> ManagerResult<FetchResponse> {
        let mut response = self.inner.fetch(url)?;
        if url != self.target {
            return Ok(response);
        }

        let mut bytes = Vec::new();
        response.body.read_to_end(&mut bytes).unwrap();
        Ok(FetchResponse::new(
            response.content_length,
            CancelOnRead {
                inner: Cursor::new(bytes),
                token: self.token.clone(),
            },
        ))
    }
}

// ============================================================================
// First install
// ============================================================================

#[test]
fn test_hello_install_fetches_manifest_then_blob() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let url = publish(&fetcher, "1", &[("a/b.txt", b"hello")]);
    let recorder = Recorder::new();

    let result = manager(&fetcher)
        .install(&url, temp.path(), Some(&recorder.callback()), false, None)
        .unwrap();

    assert_eq!(
        fetcher.requests(),
        vec![url.clone(), format!("{}v1/a/b.txt.dpcp", MIRROR)]
    );
    assert_eq!(fs::read(temp.path().join("a/b.txt")).unwrap(), b"hello");
    assert!(staging_leftovers(temp.path()).is_empty());

    assert_eq!(result.version, "1");
    assert_eq!(result.files_fetched, 1);
    assert_eq!(result.bytes_downloaded, 5);

    let events = recorder.events();
    let first = events.first().unwrap();
    assert_eq!(first.status, "Loading package manifest");
    assert_eq!((first.file_percent, first.total_percent), (Some(0), Some(0)));
    assert!(events.last().unwrap().is_done());
}

#[test]
fn test_install_creates_nested_directories() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let url = publish(
        &fetcher,
        "2.0",
        &[("bin/tool", b"#!/bin/sh\n"), ("share/doc/deep/readme.txt", b"read me")],
    );

    manager(&fetcher)
        .install(&url, temp.path(), None, false, None)
        .unwrap();

    assert!(temp.path().join("bin/tool").is_file());
    assert_eq!(
        fs::read(temp.path().join("share/doc/deep/readme.txt")).unwrap(),
        b"read me"
    );
}

#[test]
fn test_files_named_like_staging_files_survive() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let url = publish(&fetcher, "1", &[("x.dpcp", b"blob-like"), ("x", b"plain")]);
    let manager = manager(&fetcher);

    let result = manager.install(&url, temp.path(), None, false, None).unwrap();

    assert_eq!(result.files_fetched, 2);
    assert_eq!(fs::read(temp.path().join("x.dpcp")).unwrap(), b"blob-like");
    assert_eq!(fs::read(temp.path().join("x")).unwrap(), b"plain");
    assert!(!temp.path().join("x.dpcp.dpcp").exists());

    fetcher.clear_requests();
    let result = manager.install(&url, temp.path(), None, false, None).unwrap();

    assert_eq!(result.files_fetched, 0);
    assert_eq!(fetcher.requests(), vec![url]);
}

#[test]
fn test_install_without_content_length() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new().without_content_length();
    let body = payload(20_000, 3);
    let url = publish(&fetcher, "1", &[("blob.bin", &body)]);
    let recorder = Recorder::new();

    manager(&fetcher)
        .install(&url, temp.path(), Some(&recorder.callback()), false, None)
        .unwrap();

    assert_eq!(fs::read(temp.path().join("blob.bin")).unwrap(), body);
    let partial: Vec<u8> = recorder
        .events()
        .iter()
        .filter(|e| e.status.starts_with("Downloading"))
        .filter_map(|e| e.file_percent)
        .filter(|p| *p < COMPLETE_PERCENT)
        .collect();
    assert!(!partial.is_empty());
}

// ============================================================================
// Repair
// ============================================================================

#[test]
fn test_second_install_fetches_only_manifest() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let url = publish(&fetcher, "1", &[("a.txt", b"alpha"), ("b/c.txt", b"charlie")]);
    let manager = manager(&fetcher);

    manager.install(&url, temp.path(), None, false, None).unwrap();
    fetcher.clear_requests();

    let recorder = Recorder::new();
    let result = manager
        .install(&url, temp.path(), Some(&recorder.callback()), false, None)
        .unwrap();

    assert_eq!(fetcher.requests(), vec![url]);
    assert_eq!(result.files_fetched, 0);
    assert_eq!(result.files_skipped, 2);
    assert!(recorder.events().last().unwrap().is_done());
}

#[test]
fn test_wrong_content_is_refetched_alone() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let url = publish(&fetcher, "1", &[("a.txt", b"alpha"), ("b.txt", b"bravo")]);
    let manager = manager(&fetcher);

    manager.install(&url, temp.path(), None, false, None).unwrap();
    // same size, different bytes
    write_file(temp.path(), "b.txt", b"BRAVO");
    fetcher.clear_requests();

    let result = manager.install(&url, temp.path(), None, false, None).unwrap();

    assert_eq!(
        fetcher.requests(),
        vec![url, format!("{}v1/b.txt.dpcp", MIRROR)]
    );
    assert_eq!(result.files_fetched, 1);
    assert_eq!(fs::read(temp.path().join("b.txt")).unwrap(), b"bravo");
}

#[test]
fn test_wrong_size_is_refetched_alone() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let url = publish(&fetcher, "1", &[("a.txt", b"alpha"), ("b.txt", b"bravo")]);
    let manager = manager(&fetcher);

    manager.install(&url, temp.path(), None, false, None).unwrap();
    write_file(temp.path(), "a.txt", b"alpha plus a tail");
    fetcher.clear_requests();

    manager.install(&url, temp.path(), None, false, None).unwrap();

    assert_eq!(
        fetcher.requests(),
        vec![url, format!("{}v1/a.txt.dpcp", MIRROR)]
    );
    assert_eq!(fs::read(temp.path().join("a.txt")).unwrap(), b"alpha");
}

#[test]
fn test_new_version_replaces_changed_files() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let url = publish(&fetcher, "1", &[("same.txt", b"same"), ("changed.txt", b"old")]);
    let manager = manager(&fetcher);
    manager.install(&url, temp.path(), None, false, None).unwrap();

    publish(&fetcher, "2", &[("same.txt", b"same"), ("changed.txt", b"new!")]);
    fetcher.clear_requests();
    let result = manager.install(&url, temp.path(), None, false, None).unwrap();

    assert_eq!(result.version, "2");
    assert_eq!(
        fetcher.requests(),
        vec![url, format!("{}v2/changed.txt.dpcp", MIRROR)]
    );
    assert_eq!(fs::read(temp.path().join("changed.txt")).unwrap(), b"new!");
}

// ============================================================================
// Failure and cancellation
// ============================================================================

#[test]
fn test_cancel_mid_file_keeps_previous_content() {
    let temp = TempDir::new().unwrap();
    let inner = MemoryFetcher::new();
    let body = payload(20_000, 7);
    let url = publish(&inner, "1", &[("first.txt", b"first"), ("big.bin", &body)]);
    write_file(temp.path(), "big.bin", b"previous contents");

    let token = CancellationToken::new();
    let fetcher = CancellingFetcher {
        inner: inner.clone(),
        target: format!("{}v1/big.bin.dpcp", MIRROR),
        token: token.clone(),
    };
    let installer = PackageInstaller::new(fetcher).with_buffer_sizing(FixedBufferSize::new(4096));

    let result = installer.install(
        &url,
        temp.path(),
        InstallOptions::default(),
        None,
        Some(&token),
    );

    assert!(matches!(result, Err(ManagerError::Cancelled)));
    assert_eq!(fs::read(temp.path().join("first.txt")).unwrap(), b"first");
    assert_eq!(
        fs::read(temp.path().join("big.bin")).unwrap(),
        b"previous contents"
    );

    // resuming fetches only the interrupted file
    inner.clear_requests();
    let result = manager(&inner)
        .install(&url, temp.path(), None, false, None)
        .unwrap();
    assert_eq!(result.files_skipped, 1);
    assert_eq!(result.files_fetched, 1);
    assert_eq!(fs::read(temp.path().join("big.bin")).unwrap(), body);
}

#[test]
fn test_cancel_before_start_fetches_nothing() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let url = publish(&fetcher, "1", &[("a.txt", b"alpha")]);
    let token = CancellationToken::new();
    token.cancel();

    let result = manager(&fetcher).install(&url, temp.path(), None, false, Some(&token));

    assert!(matches!(result, Err(ManagerError::Cancelled)));
    assert!(fetcher.requests().is_empty());
    assert!(!temp.path().join("a.txt").exists());
}

#[test]
fn test_missing_blob_keeps_committed_files() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let url = publish(&fetcher, "1", &[("a.txt", b"alpha"), ("b.txt", b"bravo")]);
    fetcher.remove(&format!("{}v1/b.txt.dpcp", MIRROR));

    let result = manager(&fetcher).install(&url, temp.path(), None, false, None);

    assert!(matches!(result, Err(ManagerError::DownloadFailed { .. })));
    assert_eq!(fs::read(temp.path().join("a.txt")).unwrap(), b"alpha");
    assert!(!temp.path().join("b.txt").exists());
}

#[test]
fn test_malformed_manifest_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let url = format!("{}package.json", MIRROR);
    fetcher.insert(url.clone(), b"{ not json".to_vec());

    let result = manager(&fetcher).install(&url, temp.path(), None, false, None);

    assert!(matches!(
        result,
        Err(ManagerError::ManifestParseFailed { .. })
    ));
}

// ============================================================================
// Pruning
// ============================================================================

#[test]
fn test_prune_deletes_exactly_extraneous_files() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let url = publish(&fetcher, "1", &[("keep/a.txt", b"alpha"), ("b.txt", b"bravo")]);
    write_file(temp.path(), "b.txt", b"stale");
    write_file(temp.path(), "keep/user.cfg", b"mine");
    write_file(temp.path(), "other/notes.md", b"notes");

    let result = manager(&fetcher)
        .install(&url, temp.path(), None, true, None)
        .unwrap();

    assert_eq!(result.files_pruned, 2);
    assert!(!temp.path().join("keep/user.cfg").exists());
    assert!(!temp.path().join("other/notes.md").exists());
    assert_eq!(fs::read(temp.path().join("keep/a.txt")).unwrap(), b"alpha");
    assert_eq!(fs::read(temp.path().join("b.txt")).unwrap(), b"bravo");
}

#[test]
fn test_without_prune_extraneous_files_survive() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let url = publish(&fetcher, "1", &[("a.txt", b"alpha")]);
    write_file(temp.path(), "user.cfg", b"mine");

    let result = manager(&fetcher)
        .install(&url, temp.path(), None, false, None)
        .unwrap();

    assert_eq!(result.files_pruned, 0);
    assert_eq!(fs::read(temp.path().join("user.cfg")).unwrap(), b"mine");
}

// ============================================================================
// Progress
// ============================================================================

#[test]
fn test_progress_is_monotonic_with_one_completion_per_file() {
    let temp = TempDir::new().unwrap();
    let fetcher = MemoryFetcher::new();
    let big = payload(40_000, 1);
    let medium = payload(9_000, 2);
    let url = publish(
        &fetcher,
        "1",
        &[("big.bin", &big), ("medium.bin", &medium), ("tiny.txt", b"t")],
    );
    // one file already in place
    write_file(temp.path(), "medium.bin", &medium);
    let recorder = Recorder::new();

    let result = manager(&fetcher)
        .install(&url, temp.path(), Some(&recorder.callback()), false, None)
        .unwrap();
    assert_eq!(result.files_fetched, 2);

    let events = recorder.events();
    let (done, body) = events.split_last().unwrap();
    assert!(done.is_done());

    let mut last_total = 0;
    for event in body {
        if let Some(total) = event.total_percent {
            assert!(total >= last_total, "total went backwards: {:?}", event);
            assert!(total < COMPLETE_PERCENT);
            last_total = total;
        }
    }

    for path in ["big.bin", "tiny.txt"] {
        let status = format!("Downloading: {}", path);
        let file_events: Vec<Option<u8>> = body
            .iter()
            .filter(|e| e.status == status)
            .map(|e| e.file_percent)
            .collect();

        let completions = file_events
            .iter()
            .filter(|p| **p == Some(COMPLETE_PERCENT))
            .count();
        assert_eq!(completions, 1, "{}", path);
        assert_eq!(*file_events.last().unwrap(), Some(COMPLETE_PERCENT));

        let known: Vec<u8> = file_events.iter().flatten().copied().collect();
        assert!(known.windows(2).all(|w| w[0] <= w[1]), "{}: {:?}", path, known);
    }

    // the big file streams in several chunks
    assert!(
        body.iter()
            .filter(|e| e.status == "Downloading: big.bin")
            .count()
            > 2
    );

    // skipped files report a scan but never a download
    assert!(body.iter().any(|e| e.status == "Scanning: medium.bin"));
    assert!(!body.iter().any(|e| e.status == "Downloading: medium.bin"));
}
