//! Raw file loading
//!
//! The loading phase reads every file an application needs into a
//! [`FileDataCache`] before the main scene starts. [`BackgroundLoader`] does
//! that on a worker thread and hands the finished cache back over a channel,
//! so the cache is only ever observed after the worker is done with it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use super::AssetError;

/// File contents keyed by the path they were requested with
#[derive(Debug, Clone, Default)]
pub struct FileDataCache {
    files: HashMap<String, Vec<u8>>,
}

impl FileDataCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every path into a new cache, failing on the first unreadable file
    pub fn load_all<I, P>(paths: I) -> Result<Self, AssetError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut cache = Self::new();
        for path in paths {
            let path = path.as_ref();
            let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            log::trace!("Read {} ({} bytes)", path.display(), bytes.len());
            cache.insert(path.to_string_lossy(), bytes);
        }
        Ok(cache)
    }

    /// Store file contents
    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    /// Contents of a cached file
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Whether a file is cached
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Number of cached files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total cached bytes
    pub fn total_bytes(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

/// One-shot file loading on a worker thread
#[derive(Debug)]
pub struct BackgroundLoader {
    receiver: Receiver<Result<FileDataCache, AssetError>>,
    worker: Option<JoinHandle<()>>,
    delivered: bool,
}

impl BackgroundLoader {
    /// Start reading `paths` on a new thread
    pub fn spawn<P>(paths: Vec<P>) -> Self
    where
        P: AsRef<Path> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        log::info!("Background loading {} files", paths.len());

        let worker = thread::spawn(move || {
            let result = FileDataCache::load_all(paths);
            // Receiver may already be gone if the loader was dropped
            let _ = sender.send(result);
        });

        Self {
            receiver,
            worker: Some(worker),
            delivered: false,
        }
    }

    /// Take the result if the worker has finished, never blocking
    ///
    /// Returns `Some` exactly once.
    pub fn poll(&mut self) -> Option<Result<FileDataCache, AssetError>> {
        if self.delivered {
            return None;
        }
        let result = match self.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(AssetError::LoaderDisconnected),
        };
        self.finish();
        Some(result)
    }

    /// Block until the worker has finished
    pub fn wait(mut self) -> Result<FileDataCache, AssetError> {
        if self.delivered {
            return Err(AssetError::LoaderDisconnected);
        }
        let result = self
            .receiver
            .recv()
            .map_err(|_| AssetError::LoaderDisconnected)?;
        self.finish();
        result
    }

    /// Whether the result has been handed out
    pub fn is_delivered(&self) -> bool {
        self.delivered
    }

    fn finish(&mut self) {
        self.delivered = true;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Asset loader thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("room_engine_{}_{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_all_reads_files() {
        let a = temp_file("load_all_a.bin", b"abc");
        let b = temp_file("load_all_b.bin", b"hello");

        let cache = FileDataCache::load_all([&a, &b]).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&a.to_string_lossy()), Some(&b"abc"[..]));
        assert_eq!(cache.total_bytes(), 8);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let missing = std::env::temp_dir().join("room_engine_definitely_missing.obj");
        match FileDataCache::load_all([&missing]) {
            Err(AssetError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_background_loader_delivers_once() {
        let path = temp_file("background.txt", b"scene");
        let key = path.to_string_lossy().into_owned();

        let mut loader = BackgroundLoader::spawn(vec![path]);
        let cache = loop {
            if let Some(result) = loader.poll() {
                break result.unwrap();
            }
            thread::yield_now();
        };

        assert!(cache.contains(&key));
        assert!(loader.is_delivered());
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_background_loader_wait_propagates_errors() {
        let loader = BackgroundLoader::spawn(vec![PathBuf::from("/nonexistent/room_engine/file.obj")]);
        assert!(matches!(loader.wait(), Err(AssetError::Io { .. })));
    }
}
