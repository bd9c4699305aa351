//! Per-file task set
//!
//! Wraps a [`JoinSet`] and remembers which source path each task belongs
//! to, so a task that panics or is cancelled is still reported against its
//! file.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use tokio::task::{Id, JoinError, JoinSet};

pub(crate) struct FileTasks<T> {
    set: JoinSet<T>,
    paths: HashMap<Id, PathBuf>,
}

impl<T: Send + 'static> FileTasks<T> {
    pub(crate) fn new() -> Self {
        Self {
            set: JoinSet::new(),
            paths: HashMap::new(),
        }
    }

    /// Spawn `task` on behalf of `path`
    pub(crate) fn spawn<F>(&mut self, path: PathBuf, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let handle = self.set.spawn(task);
        self.paths.insert(handle.id(), path);
    }

    /// Next finished task, if one is ready without waiting
    pub(crate) fn try_next(&mut self) -> Option<(PathBuf, Result<T, JoinError>)> {
        let joined = self.set.try_join_next_with_id()?;
        Some(self.attribute(joined))
    }

    /// Wait for the next task; `None` once the set is empty
    pub(crate) async fn next(&mut self) -> Option<(PathBuf, Result<T, JoinError>)> {
        let joined = self.set.join_next_with_id().await?;
        Some(self.attribute(joined))
    }

    fn attribute(&mut self, joined: Result<(Id, T), JoinError>) -> (PathBuf, Result<T, JoinError>) {
        match joined {
            Ok((id, value)) => (self.paths.remove(&id).unwrap_or_default(), Ok(value)),
            Err(e) => (self.paths.remove(&e.id()).unwrap_or_default(), Err(e)),
        }
    }
}
