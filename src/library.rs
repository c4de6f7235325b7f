//! Process-wide backend initialization.
//!
//! The host calls [`initialize`] once at startup and gets a [`Library`]
//! handle back; later calls return the same handle. Streams are created
//! from the handle.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use crate::backend::{PlotBackend, StreamId};
use crate::error::{PlotError, PlotResult};
use crate::stream::PlStream;

static LIBRARY: OnceCell<Library> = OnceCell::new();

/// Shared handle to an initialized backend
#[derive(Clone)]
pub struct Library {
    backend: Arc<dyn PlotBackend>,
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library").finish_non_exhaustive()
    }
}

/// Load the native plotting library for this process.
///
/// Runs the check only on the first successful call. Fails when the crate
/// was built without the `native` feature.
pub fn initialize() -> PlotResult<Library> {
    LIBRARY.get_or_try_init(load_native).cloned()
}

#[cfg(feature = "native")]
fn load_native() -> PlotResult<Library> {
    let library = Library::with_backend(Arc::new(crate::native::NativeBackend::new()));
    let version = library.version()?;
    if version.is_empty() {
        return Err(PlotError::LibraryUnavailable(
            "plgver returned an empty version".to_string(),
        ));
    }
    info!("Loaded PLplot {}", version);
    Ok(library)
}

#[cfg(not(feature = "native"))]
fn load_native() -> PlotResult<Library> {
    tracing::warn!("Native backend requested but crate built without the `native` feature");
    Err(PlotError::LibraryUnavailable(
        "built without the `native` feature".to_string(),
    ))
}

impl Library {
    /// Wrap an arbitrary backend. Does not touch the process-wide handle.
    pub fn with_backend(backend: Arc<dyn PlotBackend>) -> Self {
        Self { backend }
    }

    /// The process-wide handle, if [`initialize`] has succeeded
    pub fn get() -> Option<Library> {
        LIBRARY.get().cloned()
    }

    pub fn backend(&self) -> Arc<dyn PlotBackend> {
        Arc::clone(&self.backend)
    }

    /// Allocate a new stream
    pub fn new_stream(&self) -> PlotResult<PlStream> {
        PlStream::new(self.backend())
    }

    pub fn version(&self) -> PlotResult<String> {
        self.backend.version()
    }

    /// The backend-global current stream
    pub fn current_stream(&self) -> PlotResult<StreamId> {
        self.backend.current_stream()
    }

    /// Close every open stream at once
    pub fn end_all(&self) -> PlotResult<()> {
        info!("Ending all streams");
        self.backend.end_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Call, RecordingBackend};

    #[test]
    fn test_streams_from_library_are_distinct() {
        let backend = RecordingBackend::new();
        let library = Library::with_backend(Arc::new(backend.clone()));
        let a = library.new_stream().unwrap();
        let b = library.new_stream().unwrap();
        assert_ne!(a.stream_id(), b.stream_id());
    }

    #[test]
    fn test_end_all_is_global() {
        let backend = RecordingBackend::new();
        let library = Library::with_backend(Arc::new(backend.clone()));
        library.end_all().unwrap();
        let last = backend.last_call().unwrap();
        assert_eq!(last.stream, None);
        assert_eq!(last.call, Call::EndAll);
    }

    #[cfg(not(feature = "native"))]
    #[test]
    fn test_initialize_without_native_feature() {
        let err = initialize().unwrap_err();
        assert!(matches!(err, PlotError::LibraryUnavailable(_)));
        assert!(Library::get().is_none());
    }
}
