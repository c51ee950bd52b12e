//! Background scanning.
//!
//! A producer thread finds PKG files and loads their metadata while the
//! consumer works through the results. Results arrive over a channel and are
//! kept in a vector that only the consumer touches, so indices stay valid and
//! the consumer can go back to earlier files.

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use pkgrename_pkg::{PkgData, ScanError};
use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// One discovered PKG file.
#[derive(Debug)]
pub struct ScanResult {
    pub path: PathBuf,
    pub result: Result<PkgData, ScanError>,
    /// Set once the consumer has shown this file.
    pub seen: bool,
}

impl ScanResult {
    /// Returns the file name part of the path.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or(self.path.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

/// Producer side of a [`ScanList`].
#[derive(Debug, Clone)]
pub struct ScanSink {
    tx: Sender<ScanResult>,
}

impl ScanSink {
    /// Hands a result to the consumer. Returns `false` once the consumer is
    /// gone and scanning should stop.
    pub fn push(&self, path: PathBuf, result: Result<PkgData, ScanError>) -> bool {
        self.tx
            .send(ScanResult {
                path,
                result,
                seen: false,
            })
            .is_ok()
    }

    /// Loads `path` and pushes the result.
    pub fn scan(&self, path: PathBuf) -> bool {
        debug!(path = %path.display(), "scanning");
        let result = PkgData::load(&path);
        self.push(path, result)
    }
}

/// Results received so far, addressed by index.
#[derive(Debug)]
pub struct ScanList {
    rx: Receiver<ScanResult>,
    results: Vec<ScanResult>,
    finished: bool,
}

impl ScanList {
    /// Starts scanning `inputs` on a new thread.
    ///
    /// Files are scanned as given. Directories are searched for `.pkg`
    /// files, descending into subdirectories only if `recursive` is set.
    #[must_use]
    pub fn spawn(inputs: Vec<PathBuf>, recursive: bool) -> Self {
        Self::spawn_with(move |sink| {
            for input in inputs {
                if !scan_input(sink, input, recursive) {
                    break;
                }
            }
        })
    }

    /// Runs `producer` on a new thread. The list is finished when it returns.
    pub fn spawn_with<F>(producer: F) -> Self
    where
        F: FnOnce(&ScanSink) + Send + 'static,
    {
        let (tx, rx) = channel::unbounded();

        thread::spawn(move || {
            let sink = ScanSink { tx };
            producer(&sink);
            debug!("scan finished");
        });

        Self {
            rx,
            results: Vec::new(),
            finished: false,
        }
    }

    /// Moves every result that has already arrived into the list.
    fn drain(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(result) => self.results.push(result),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    break;
                }
            }
        }
    }

    /// Blocks until result `index` exists or the producer has finished.
    fn wait_for(&mut self, index: usize) {
        self.drain();
        while index >= self.results.len() && !self.finished {
            match self.rx.recv() {
                Ok(result) => self.results.push(result),
                Err(_) => self.finished = true,
            }
        }
    }

    /// Returns result `index`, waiting for it if necessary.
    ///
    /// `None` means the producer finished with fewer results.
    pub fn get(&mut self, index: usize) -> Option<&ScanResult> {
        self.wait_for(index);
        self.results.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ScanResult> {
        self.wait_for(index);
        self.results.get_mut(index)
    }

    /// Returns the closest earlier result that loaded successfully.
    #[must_use]
    pub fn prev_index(&self, index: usize) -> Option<usize> {
        self.results
            .get(..index.min(self.results.len()))?
            .iter()
            .rposition(|r| r.result.is_ok())
    }

    /// Number of results received so far.
    #[must_use]
    pub fn received(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` once the producer is done and all results are in.
    pub fn is_finished(&mut self) -> bool {
        self.drain();
        self.finished
    }
}

fn is_pkg(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pkg"))
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(['.', '$']))
}

/// Files first, then directories, each sorted by name.
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Scans one command-line input. Returns `false` if scanning should stop.
fn scan_input(sink: &ScanSink, input: PathBuf, recursive: bool) -> bool {
    if !input.is_dir() {
        return sink.scan(input);
    }

    let walker = WalkDir::new(&input)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by(files_first)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden_dir(entry));

    for entry in walker {
        match entry {
            Ok(entry) if !entry.file_type().is_dir() && is_pkg(entry.path()) => {
                if !sink.scan(entry.into_path()) {
                    return false;
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "cannot read directory entry"),
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgrename_test_utils::{example_game, temp_dir};
    use proptest::prelude::*;
    use std::fs;

    fn names(list: &mut ScanList) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(result) = list.get(out.len()) {
            out.push(result.file_name());
        }
        out
    }

    #[test]
    fn directories_are_walked_files_first() {
        let dir = temp_dir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::create_dir_all(root.join("$RECYCLE.BIN")).unwrap();

        let game = example_game();
        game.write_to(root, "b.pkg").unwrap();
        game.write_to(root, "a.PKG").unwrap();
        game.write_to(&root.join("sub"), "c.pkg").unwrap();
        game.write_to(&root.join(".hidden"), "d.pkg").unwrap();
        game.write_to(&root.join("$RECYCLE.BIN"), "e.pkg").unwrap();
        game.write_to(root, ".dotfile.pkg").unwrap();
        fs::write(root.join("notes.txt"), "x").unwrap();

        let mut flat = ScanList::spawn(vec![root.to_path_buf()], false);
        assert_eq!(names(&mut flat), vec![".dotfile.pkg", "a.PKG", "b.pkg"]);
        assert!(flat.is_finished());

        let mut deep = ScanList::spawn(vec![root.to_path_buf()], true);
        assert_eq!(names(&mut deep), vec![".dotfile.pkg", "a.PKG", "b.pkg", "c.pkg"]);
    }

    #[test]
    fn explicit_files_are_scanned_even_with_other_extensions() {
        let dir = temp_dir().unwrap();
        let bad = dir.path().join("broken.bin");
        fs::write(&bad, b"nope").unwrap();
        let good = example_game().write_to(dir.path(), "good.pkg").unwrap();

        let mut list = ScanList::spawn(vec![bad, good, dir.path().join("missing.pkg")], false);

        assert!(matches!(
            list.get(0).unwrap().result,
            Err(ScanError::ReadFile { .. })
        ));
        assert!(list.get(1).unwrap().result.is_ok());
        assert!(matches!(
            list.get(2).unwrap().result,
            Err(ScanError::OpenFile { .. })
        ));
        assert!(list.get(3).is_none());
    }

    #[test]
    fn back_navigation_skips_errors() {
        let dir = temp_dir().unwrap();
        let good = example_game().write_to(dir.path(), "good.pkg").unwrap();
        let paths = vec![good.clone(), dir.path().join("missing.pkg"), good];

        let mut list = ScanList::spawn(paths, false);
        assert!(list.get(2).is_some());

        assert_eq!(list.prev_index(2), Some(0));
        assert_eq!(list.prev_index(1), Some(0));
        assert_eq!(list.prev_index(0), None);
        assert_eq!(list.prev_index(99), Some(2));
    }

    #[test]
    fn custom_producer_and_seen_flag() {
        let mut list = ScanList::spawn_with(|sink| {
            for i in 0..3 {
                sink.push(
                    PathBuf::from(format!("{i}.pkg")),
                    Err(ScanError::NotAPkg),
                );
            }
        });

        list.get_mut(1).unwrap().seen = true;
        assert!(!list.get(0).unwrap().seen);
        assert!(list.get(1).unwrap().seen);
        assert!(list.get(3).is_none());
        assert_eq!(list.received(), 3);
        assert!(list.is_finished());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn lookups_match_production_order(
            count in 0usize..20,
            yields in proptest::collection::vec(0u8..4, 20),
            lookups in proptest::collection::vec(0usize..24, 1..40),
        ) {
            let mut list = ScanList::spawn_with(move |sink| {
                for i in 0..count {
                    for _ in 0..yields[i] {
                        thread::yield_now();
                    }
                    sink.push(PathBuf::from(format!("{i}.pkg")), Err(ScanError::NotAPkg));
                }
            });

            for index in lookups {
                let found = list.get(index).map(ScanResult::file_name);
                if index < count {
                    prop_assert_eq!(found, Some(format!("{index}.pkg")));
                } else {
                    prop_assert_eq!(found, None);
                }
            }
        }
    }
}
