//! Per-stream bindings to the PLplot plotting library.
//!
//! A [`PlStream`] is a drawable: allocate one from a [`Library`] and invoke
//! the plotting API on it. Each method forwards to the matching PLplot entry
//! point with that stream selected.
//!
//! ```no_run
//! # fn main() -> plstream::PlotResult<()> {
//! let library = plstream::initialize()?;
//! let pls = library.new_stream()?;
//! pls.init()?;
//! pls.set_environment(0.0, 1.0, 0.0, 1.0, 0, 0)?;
//! pls.draw_line_segment(0.0, 0.0, 1.0, 1.0)?;
//! pls.end()?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
#[cfg(feature = "native")]
pub mod ffi;
pub mod library;
#[cfg_attr(not(feature = "native"), allow(dead_code))]
mod marshal;
#[cfg(feature = "native")]
pub mod native;
pub mod options;
pub mod recording;
pub mod stream;

pub use backend::{Axis3, PageSetup, PlotBackend, StreamId};
pub use error::{PlotError, PlotResult};
pub use library::{initialize, Library};
#[cfg(feature = "native")]
pub use native::NativeBackend;
pub use options::{parse_args, parse_args_with, ParseMode, ParseOutcome, StreamOptions};
pub use recording::RecordingBackend;
pub use stream::PlStream;
