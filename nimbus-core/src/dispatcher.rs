use std::fmt::Debug;

use tokio::runtime::Handle;

/// Names the two execution contexts the fetch pipeline runs on.
///
/// Fetch work (location resolution, the network call) is spawned on the
/// `io` handle; `main` is the context the embedding view layer observes
/// state from. Keeping both behind a trait makes the view-model's threading
/// policy swappable in tests.
pub trait Dispatcher: Send + Sync + Debug {
    fn io(&self) -> &Handle;
    fn main(&self) -> &Handle;
}

/// Default dispatcher backed by tokio runtime handles.
///
/// The two handles may refer to the same runtime; the CLI wires it that way.
#[derive(Debug, Clone)]
pub struct RuntimeDispatcher {
    io: Handle,
    main: Handle,
}

impl RuntimeDispatcher {
    pub fn new(io: Handle, main: Handle) -> Self {
        Self { io, main }
    }

    /// Both contexts on the caller's current runtime.
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime, same as [`Handle::current`].
    pub fn current() -> Self {
        let handle = Handle::current();
        Self {
            io: handle.clone(),
            main: handle,
        }
    }
}

impl Dispatcher for RuntimeDispatcher {
    fn io(&self) -> &Handle {
        &self.io
    }

    fn main(&self) -> &Handle {
        &self.main
    }
}
