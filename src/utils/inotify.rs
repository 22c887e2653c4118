use std::{collections::HashMap, ffi::CString, path::Path, thread, time::Duration};

use anyhow::{Context, Result};
use inotify::{EventMask, Inotify, WatchMask};

const WAIT_RECREATE_US: u64 = 500 * 1000;
const RECREATE_DEFAULT_PERM: u32 = 0o666;

/// Blocking watcher over a set of control nodes. Watches survive the node
/// being deleted or atomically replaced: the watch is re-armed against the
/// new inode once the path reappears.
pub struct NodeWatcher {
    inotify: Inotify,
    watches: HashMap<inotify::WatchDescriptor, String>,
}

impl NodeWatcher {
    pub fn new() -> Result<Self> {
        let inotify = Inotify::init().with_context(|| "Failed to initialize inotify")?;

        Ok(Self {
            inotify,
            watches: HashMap::new(),
        })
    }

    pub fn add<P: AsRef<Path>>(&mut self, path: P, mask: WatchMask) -> Result<()> {
        let path_ref = path.as_ref();
        let path_str = path_ref
            .to_str()
            .with_context(|| format!("Invalid path: {}", path_ref.display()))?;

        let mask = mask | WatchMask::DELETE_SELF | WatchMask::MOVE_SELF;

        let wd = self
            .inotify
            .watches()
            .add(path_ref, mask)
            .with_context(|| format!("Failed to add watch for: {}", path_ref.display()))?;

        self.watches.insert(wd, path_str.to_string());

        Ok(())
    }

    /// Block until any watched node changes, re-arming replaced watches.
    pub fn wait(&mut self) -> Result<()> {
        let mut buffer = [0; 4096];
        let events = self
            .inotify
            .read_events_blocking(&mut buffer)
            .with_context(|| "Failed to read inotify events")?;

        let mut watches_to_rearm = Vec::new();
        for event in events {
            if !event.mask.contains(EventMask::IGNORED)
                && !event.mask.contains(EventMask::DELETE_SELF)
                && !event.mask.contains(EventMask::MOVE_SELF)
            {
                continue;
            }
            if let Some(path) = self.watches.get(&event.wd) {
                watches_to_rearm.push((event.wd.clone(), path.clone()));
            }
        }

        for (wd, path) in watches_to_rearm {
            try_path(&path);

            let mask = WatchMask::MODIFY
                | WatchMask::CLOSE_WRITE
                | WatchMask::DELETE_SELF
                | WatchMask::MOVE_SELF;

            let new_wd = self
                .inotify
                .watches()
                .add(&path, mask)
                .with_context(|| format!("Failed to re-add watch for: {path}"))?;

            self.watches.remove(&wd);
            self.watches.insert(new_wd, path);
        }

        Ok(())
    }
}

fn try_path(path: &str) {
    if !Path::new(path).exists() {
        // Give the editor/installer a moment to finish the rename
        thread::sleep(Duration::from_micros(WAIT_RECREATE_US));

        if let Ok(c_path) = CString::new(path) {
            unsafe {
                libc::chmod(c_path.as_ptr(), RECREATE_DEFAULT_PERM);
            }
        }
    }
}
