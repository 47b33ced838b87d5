//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use cloudpkg::manager::{
    calculate_checksum, InstallProgress, InstallProgressCallback, MemoryFetcher,
};
use cloudpkg::package::{file_url, serialize_manifest, FileEntry, PackageManifest};

pub const MIRROR: &str = "https://mirror.test/app/";

/// Publish `files` into `fetcher` under [`MIRROR`] and return the manifest URL.
pub fn publish(fetcher: &MemoryFetcher, version: &str, files: &[(&str, &[u8])]) -> String {
    let manifest_url = format!("{}package.json", MIRROR);
    let mut manifest = PackageManifest::new(Some("app".to_string()), version);

    for (path, bytes) in files {
        let sha256 = calculate_checksum(*bytes).unwrap();
        manifest
            .files
            .push(FileEntry::new(*path, bytes.len() as u64, sha256));
        fetcher.insert(file_url(&manifest_url, version, path), bytes.to_vec());
    }

    fetcher.insert(manifest_url.clone(), serialize_manifest(&manifest).unwrap());
    manifest_url
}

/// Write `bytes` to `root/relative`, creating parents.
pub fn write_file(root: &Path, relative: &str, bytes: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

/// Deterministic non-repeating payload of `len` bytes.
pub fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u32).wrapping_mul(31).wrapping_add(seed as u32) as u8)
        .collect()
}

/// Collects every progress event.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<InstallProgress>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> InstallProgressCallback {
        let events = Arc::clone(&self.events);
        Box::new(move |p: &InstallProgress| events.lock().unwrap().push(p.clone()))
    }

    pub fn events(&self) -> Vec<InstallProgress> {
        self.events.lock().unwrap().clone()
    }
}

/// Files under `root` whose name ends with the staging suffix.
pub fn staging_leftovers(root: &Path) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else if path.to_string_lossy().ends_with(".dpcp") {
                found.push(path.display().to_string());
            }
        }
    }
    found
}
