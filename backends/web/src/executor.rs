use futures::future::LocalBoxFuture;
use xframe::Executor;

/// Executor running tasks on the browser's event loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebExecutor;

impl Executor for WebExecutor {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
