//! Input vocabulary and graphics context lifecycle for SurfaceVis hosts.
//!
//! # Graphics Context
//! Windowing libraries usually keep process-wide state that must be initialized once before any
//! window exists and torn down after the last one is gone. [GraphicsContext] models this as a
//! guard: acquire it once at startup and keep it alive for as long as windows may exist.
//!
//! # Additional Notes
//! - Pointer coordinates handed to hosts are in window pixels with the origin at the top left,
//!   positive X going right and positive Y going down

#[macro_use]
extern crate failure_derive;
#[macro_use]
extern crate log;

use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::marker::PhantomData;

pub mod event;

type PhantomNotSend = PhantomData<*const ()>;

lazy_static! {
    /// Name of the application currently holding the context, if any.
    static ref HOLDER: Mutex<Option<String>> = Mutex::new(None);
}

/// Graphics context errors.
#[derive(Fail, Debug, Clone, PartialEq)]
pub enum ContextError {
    /// Another guard is still alive; the argument is the name it was acquired with.
    #[fail(display = "graphics context already acquired by “{}”", _0)]
    AlreadyAcquired(String),
}

/// The process-wide graphics context.
///
/// Created with [GraphicsContext::acquire] and released on drop. Not [Send]: the context must be
/// released on the thread that acquired it.
pub struct GraphicsContext {
    name: String,
    _not_send: PhantomNotSend,
}

impl GraphicsContext {
    /// Acquires the graphics context for the named application.
    ///
    /// Fails if another guard is alive anywhere in the process.
    pub fn acquire(name: &str) -> Result<GraphicsContext, ContextError> {
        let mut holder = HOLDER.lock();
        if let Some(current) = &*holder {
            return Err(ContextError::AlreadyAcquired(current.clone()));
        }
        debug!(target: "surfacevis", "Acquiring graphics context for “{}”", name);
        *holder = Some(name.into());

        Ok(GraphicsContext {
            name: name.into(),
            _not_send: PhantomData,
        })
    }

    /// Returns true if some guard is currently alive.
    pub fn is_acquired() -> bool {
        HOLDER.lock().is_some()
    }

    /// The name this context was acquired with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for GraphicsContext {
    fn drop(&mut self) {
        debug!(target: "surfacevis", "Releasing graphics context for “{}”", self.name);
        *HOLDER.lock() = None;
    }
}

// single test so parallel test threads never race on the global holder
#[test]
fn context_lifecycle() {
    let ctx = GraphicsContext::acquire("first").unwrap();
    assert_eq!(ctx.name(), "first");
    assert!(GraphicsContext::is_acquired());

    match GraphicsContext::acquire("second") {
        Err(ContextError::AlreadyAcquired(name)) => assert_eq!(name, "first"),
        Ok(_) => panic!("context was acquired twice"),
    }

    drop(ctx);
    assert!(!GraphicsContext::is_acquired());

    let again = GraphicsContext::acquire("second").unwrap();
    assert_eq!(again.name(), "second");
}
