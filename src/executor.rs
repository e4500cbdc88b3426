//! Scheduling of load continuations.
//!
//! Elements live on a single logical thread. Issuing a load returns immediately;
//! the continuation runs later as a separate task on an [`Executor`].

use futures::executor::LocalSpawner;
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use tracing::error;

/// Spawns `!Send` tasks on the current thread.
pub trait Executor {
    /// Schedules `task` to run to completion. The task is detached.
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

impl<E: Executor + ?Sized> Executor for &E {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        (**self).spawn(task);
    }
}

/// Executor backed by a [`futures::executor::LocalPool`].
impl Executor for LocalSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.spawn_local(task) {
            error!("Failed to spawn load task: {err}");
        }
    }
}
