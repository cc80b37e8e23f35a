// src/fs/mock.rs

use super::FileSystem;
use crate::types::Mtime;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Milliseconds the logical clock advances on every mutation.
pub const TICK_MS: i64 = 1_000;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { content: Vec<u8>, mtime: Mtime },
    Dir { children: Vec<String>, mtime: Mtime },
}

#[derive(Debug)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    clock: i64,
    writes: Vec<PathBuf>,
}

/// In-memory filesystem with a logical clock.
///
/// Every mutation advances the clock by [`TICK_MS`] and stamps the touched
/// entry, so "written later" always means "newer mtime". Writes made through
/// the [`FileSystem`] trait are recorded and can be inspected with
/// [`MockFileSystem::writes`].
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        // Ensure root exists
        entries.insert(
            PathBuf::from("/"),
            MockEntry::Dir {
                children: Vec::new(),
                mtime: Mtime::from_millis(0),
            },
        );

        Self {
            state: Arc::new(Mutex::new(MockState {
                entries,
                clock: 1_000_000,
                writes: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A poisoned mock only happens after a panicking test; keep going.
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Current value of the logical clock.
    pub fn now(&self) -> Mtime {
        Mtime::from_millis(self.lock().clock)
    }

    /// Move the logical clock forward without touching any entry.
    pub fn advance(&self, ms: i64) {
        self.lock().clock += ms;
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut state = self.lock();
        state.clock += TICK_MS;
        let mtime = Mtime::from_millis(state.clock);
        insert_file(&mut state, path.as_ref(), content.into(), mtime);
    }

    pub fn add_file_at(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>, mtime: Mtime) {
        let mut state = self.lock();
        insert_file(&mut state, path.as_ref(), content.into(), mtime);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        state.clock += TICK_MS;
        let mtime = Mtime::from_millis(state.clock);
        ensure_dir_entry(&mut state.entries, path.as_ref(), mtime);
    }

    /// Stamp an existing entry with the next clock value.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        state.clock += TICK_MS;
        let now = Mtime::from_millis(state.clock);
        set_entry_mtime(&mut state.entries, path.as_ref(), now);
    }

    pub fn set_mtime(&self, path: impl AsRef<Path>, mtime: Mtime) {
        let mut state = self.lock();
        set_entry_mtime(&mut state.entries, path.as_ref(), mtime);
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.lock();
        state.entries.retain(|p, _| !p.starts_with(path));
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            let name = name.to_string_lossy();
            if let Some(MockEntry::Dir { children, .. }) = state.entries.get_mut(parent) {
                children.retain(|c| c.as_str() != name);
            }
        }
    }

    /// File contents as UTF-8, if the file exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        match self.lock().entries.get(path.as_ref()) {
            Some(MockEntry::File { content, .. }) => {
                Some(String::from_utf8_lossy(content).into_owned())
            }
            _ => None,
        }
    }

    pub fn mtime_of(&self, path: impl AsRef<Path>) -> Option<Mtime> {
        match self.lock().entries.get(path.as_ref()) {
            Some(MockEntry::File { mtime, .. }) | Some(MockEntry::Dir { mtime, .. }) => {
                Some(*mtime)
            }
            None => None,
        }
    }

    /// Paths written through [`FileSystem::write`], in order.
    pub fn writes(&self) -> Vec<PathBuf> {
        self.lock().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.lock().writes.clear();
    }
}

fn insert_file(state: &mut MockState, path: &Path, content: Vec<u8>, mtime: Mtime) {
    state
        .entries
        .insert(path.to_path_buf(), MockEntry::File { content, mtime });

    // Ensure parent directories exist implicitly for simplicity in this mock
    if let Some(parent) = path.parent() {
        ensure_dir_entry(&mut state.entries, parent, mtime);
        link_child(&mut state.entries, parent, path);
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path, mtime: Mtime) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(
        path.to_path_buf(),
        MockEntry::Dir {
            children: Vec::new(),
            mtime,
        },
    );
    if let Some(parent) = path.parent() {
        ensure_dir_entry(entries, parent, mtime);
        link_child(entries, parent, path);
    }
}

fn link_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, path: &Path) {
    if let Some(MockEntry::Dir { children, .. }) = entries.get_mut(parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn set_entry_mtime(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path, new: Mtime) {
    match entries.get_mut(path) {
        Some(MockEntry::File { mtime, .. }) | Some(MockEntry::Dir { mtime, .. }) => *mtime = new,
        None => {}
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("not found: {path:?}"))
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::File { content, .. }) => Ok(content.clone()),
            Some(MockEntry::Dir { .. }) => {
                Err(io::Error::other(format!("is a directory: {path:?}")))
            }
            None => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.lock();
        match path.parent() {
            Some(parent) if !matches!(state.entries.get(parent), Some(MockEntry::Dir { .. })) => {
                return Err(not_found(parent));
            }
            _ => {}
        }
        state.clock += TICK_MS;
        let mtime = Mtime::from_millis(state.clock);
        insert_file(&mut state, path, contents.to_vec(), mtime);
        state.writes.push(path.to_path_buf());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        if let Some(MockEntry::File { .. }) = state.entries.get(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists: {path:?}"),
            ));
        }
        let mtime = Mtime::from_millis(state.clock);
        ensure_dir_entry(&mut state.entries, path, mtime);
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::Dir { .. }))
    }

    fn modified(&self, path: &Path) -> io::Result<Option<Mtime>> {
        Ok(self.mtime_of(path))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::Dir { children, .. }) => {
                let mut out: Vec<PathBuf> = children.iter().map(|name| path.join(name)).collect();
                out.sort();
                Ok(out)
            }
            Some(MockEntry::File { .. }) => {
                Err(io::Error::other(format!("not a directory: {path:?}")))
            }
            None => Err(not_found(path)),
        }
    }
}
