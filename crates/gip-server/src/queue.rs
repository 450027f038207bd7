//! Single-threaded task queue bound to the UI-owning thread.
//!
//! Connection threads push fully framed requests; the application's own
//! thread drains them between frames (or blocks on them in a headless
//! pump) and executes each against the backend. This is the only place
//! tree inspection and action logic runs.

use std::panic::catch_unwind;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use tracing::error;

use gip_ipc::Request;
use gip_ipc::Response;

use crate::backend::UiBackend;
use crate::dispatch::dispatch;

pub(crate) struct UiTask {
    pub request: Request,
    pub reply: Sender<Response>,
}

/// Receiving half handed to the hosting application. Dropping it makes
/// every connection thread fail its next enqueue and close.
pub struct UiTaskQueue {
    tasks: Receiver<UiTask>,
}

impl UiTaskQueue {
    pub(crate) fn new(tasks: Receiver<UiTask>) -> Self {
        Self { tasks }
    }

    /// Drain everything currently queued without blocking. Call this
    /// from the UI thread's idle handler. Returns the number of requests
    /// executed.
    pub fn process_pending<B: UiBackend>(&self, backend: &mut B) -> usize {
        let mut handled = 0;
        while let Ok(task) = self.tasks.try_recv() {
            run_task(backend, task);
            handled += 1;
        }
        handled
    }

    /// Block up to `timeout` for one request. Returns false on timeout
    /// or when the server side has shut down; headless pumps loop on
    /// this.
    pub fn process_one<B: UiBackend>(&self, backend: &mut B, timeout: Duration) -> bool {
        match self.tasks.recv_timeout(timeout) {
            Ok(task) => {
                run_task(backend, task);
                true
            }
            Err(_) => false,
        }
    }
}

fn run_task<B: UiBackend>(backend: &mut B, task: UiTask) {
    let id = task.request.id;
    let response = match catch_unwind(AssertUnwindSafe(|| dispatch(backend, &task.request))) {
        Ok(response) => response,
        Err(_) => {
            error!(id, method = %task.request.method, "handler panicked");
            Response::failure(id, &format!("internal error executing '{}'", task.request.method))
        }
    };
    // A send failure means the connection thread already gave up on the
    // reply; nothing to do.
    let _ = task.reply.send(response);
}
