//! In-memory backend that records every forwarded call.
//!
//! Used as the stand-in for the native library in tests and for dry runs of
//! the demo binary. Stream ids are handed out from a counter so every
//! allocation is distinct.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{Axis3, PageSetup, PlotBackend, StreamId};
use crate::error::{PlotError, PlotResult};

/// One axis of a recorded `box3` call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAxis {
    pub options: String,
    pub label: String,
    pub tick: f64,
    pub subticks: i32,
}

impl From<Axis3<'_>> for RecordedAxis {
    fn from(axis: Axis3<'_>) -> Self {
        Self {
            options: axis.options.to_string(),
            label: axis.label.to_string(),
            tick: axis.tick,
            subticks: axis.subticks,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AllocateStream(StreamId),
    CurrentStream,
    Version,
    EndAll,
    Advance { page: i32 },
    Box {
        x_options: String,
        x_tick: f64,
        x_subticks: i32,
        y_options: String,
        y_tick: f64,
        y_subticks: i32,
    },
    Box3 {
        x: RecordedAxis,
        y: RecordedAxis,
        z: RecordedAxis,
    },
    Color0 { index: i32 },
    End,
    Environment {
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        justify: i32,
        axis: i32,
    },
    LoadFont { font: i32 },
    Init,
    Join { x1: f64, y1: f64, x2: f64, y2: f64 },
    Labels { x_label: String, y_label: String, title: String },
    Line { x: Vec<f64>, y: Vec<f64> },
    Points { x: Vec<f64>, y: Vec<f64>, code: i32 },
    Subpages { nx: i32, ny: i32 },
    LineStyle { marks: i32, mark: i32, space: i32 },
    YAxisDigits { max_digits: i32, digits: i32 },
    StandardViewport,
    Window { x_min: f64, x_max: f64, y_min: f64, y_max: f64 },
    SetDevice(String),
    SetOutputFile(String),
    SetPage(PageSetup),
    SetOption { option: String, value: String },
    SetOrientation(i32),
    SetPenWidth(f64),
    SetColorOutput(bool),
    SetBackground { r: i32, g: i32, b: i32 },
    SetFamily { enabled: i32, number: i32, max_bytes: i32 },
    SetPause(bool),
}

/// A call together with the stream it targeted (None for global calls)
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub stream: Option<StreamId>,
    pub call: Call,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    current: i32,
    calls: Vec<Recorded>,
    fail_next: Option<String>,
}

/// Thread-safe recording backend; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every call recorded so far
    pub fn calls(&self) -> Vec<Recorded> {
        self.inner.lock().calls.clone()
    }

    /// Calls that targeted `stream`, in order
    pub fn calls_for(&self, stream: StreamId) -> Vec<Call> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|r| r.stream == Some(stream))
            .map(|r| r.call.clone())
            .collect()
    }

    pub fn last_call(&self) -> Option<Recorded> {
        self.inner.lock().calls.last().cloned()
    }

    pub fn clear(&self) {
        self.inner.lock().calls.clear();
    }

    /// Make the next forwarded call fail with a backend error
    pub fn fail_next(&self, message: impl Into<String>) {
        self.inner.lock().fail_next = Some(message.into());
    }

    fn record(&self, stream: Option<StreamId>, call: Call) -> PlotResult<()> {
        let mut inner = self.inner.lock();
        if let Some(message) = inner.fail_next.take() {
            return Err(PlotError::Backend(message));
        }
        if let Some(id) = stream {
            // Mirrors the native backend, which selects the stream first
            inner.current = id.get();
        }
        tracing::trace!(?stream, ?call, "recorded");
        inner.calls.push(Recorded { stream, call });
        Ok(())
    }

    fn on(&self, stream: StreamId, call: Call) -> PlotResult<()> {
        self.record(Some(stream), call)
    }
}

impl PlotBackend for RecordingBackend {
    fn allocate_stream(&self) -> PlotResult<StreamId> {
        let id = {
            let mut inner = self.inner.lock();
            if let Some(message) = inner.fail_next.take() {
                return Err(PlotError::Backend(message));
            }
            let id = StreamId(inner.next_id);
            inner.next_id += 1;
            id
        };
        self.record(None, Call::AllocateStream(id))?;
        Ok(id)
    }

    fn current_stream(&self) -> PlotResult<StreamId> {
        self.record(None, Call::CurrentStream)?;
        Ok(StreamId(self.inner.lock().current))
    }

    fn version(&self) -> PlotResult<String> {
        self.record(None, Call::Version)?;
        Ok(format!("recording-{}", env!("CARGO_PKG_VERSION")))
    }

    fn end_all(&self) -> PlotResult<()> {
        self.record(None, Call::EndAll)
    }

    fn advance(&self, stream: StreamId, page: i32) -> PlotResult<()> {
        self.on(stream, Call::Advance { page })
    }

    fn draw_box(
        &self,
        stream: StreamId,
        x_options: &str,
        x_tick: f64,
        x_subticks: i32,
        y_options: &str,
        y_tick: f64,
        y_subticks: i32,
    ) -> PlotResult<()> {
        self.on(
            stream,
            Call::Box {
                x_options: x_options.to_string(),
                x_tick,
                x_subticks,
                y_options: y_options.to_string(),
                y_tick,
                y_subticks,
            },
        )
    }

    fn draw_box3(
        &self,
        stream: StreamId,
        x: Axis3<'_>,
        y: Axis3<'_>,
        z: Axis3<'_>,
    ) -> PlotResult<()> {
        self.on(
            stream,
            Call::Box3 {
                x: x.into(),
                y: y.into(),
                z: z.into(),
            },
        )
    }

    fn color0(&self, stream: StreamId, index: i32) -> PlotResult<()> {
        self.on(stream, Call::Color0 { index })
    }

    fn end(&self, stream: StreamId) -> PlotResult<()> {
        self.on(stream, Call::End)
    }

    fn environment(
        &self,
        stream: StreamId,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        justify: i32,
        axis: i32,
    ) -> PlotResult<()> {
        self.on(
            stream,
            Call::Environment {
                x_min,
                x_max,
                y_min,
                y_max,
                justify,
                axis,
            },
        )
    }

    fn load_font(&self, stream: StreamId, font: i32) -> PlotResult<()> {
        self.on(stream, Call::LoadFont { font })
    }

    fn init(&self, stream: StreamId) -> PlotResult<()> {
        self.on(stream, Call::Init)
    }

    fn join(&self, stream: StreamId, x1: f64, y1: f64, x2: f64, y2: f64) -> PlotResult<()> {
        self.on(stream, Call::Join { x1, y1, x2, y2 })
    }

    fn labels(
        &self,
        stream: StreamId,
        x_label: &str,
        y_label: &str,
        title: &str,
    ) -> PlotResult<()> {
        self.on(
            stream,
            Call::Labels {
                x_label: x_label.to_string(),
                y_label: y_label.to_string(),
                title: title.to_string(),
            },
        )
    }

    fn line(&self, stream: StreamId, x: &[f64], y: &[f64]) -> PlotResult<()> {
        self.on(
            stream,
            Call::Line {
                x: x.to_vec(),
                y: y.to_vec(),
            },
        )
    }

    fn points(&self, stream: StreamId, x: &[f64], y: &[f64], code: i32) -> PlotResult<()> {
        self.on(
            stream,
            Call::Points {
                x: x.to_vec(),
                y: y.to_vec(),
                code,
            },
        )
    }

    fn subpages(&self, stream: StreamId, nx: i32, ny: i32) -> PlotResult<()> {
        self.on(stream, Call::Subpages { nx, ny })
    }

    fn line_style(&self, stream: StreamId, marks: i32, mark: i32, space: i32) -> PlotResult<()> {
        self.on(stream, Call::LineStyle { marks, mark, space })
    }

    fn y_axis_digits(&self, stream: StreamId, max_digits: i32, digits: i32) -> PlotResult<()> {
        self.on(stream, Call::YAxisDigits { max_digits, digits })
    }

    fn standard_viewport(&self, stream: StreamId) -> PlotResult<()> {
        self.on(stream, Call::StandardViewport)
    }

    fn window(
        &self,
        stream: StreamId,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    ) -> PlotResult<()> {
        self.on(
            stream,
            Call::Window {
                x_min,
                x_max,
                y_min,
                y_max,
            },
        )
    }

    fn set_device(&self, stream: StreamId, device: &str) -> PlotResult<()> {
        self.on(stream, Call::SetDevice(device.to_string()))
    }

    fn set_output_file(&self, stream: StreamId, path: &str) -> PlotResult<()> {
        self.on(stream, Call::SetOutputFile(path.to_string()))
    }

    fn set_page(&self, stream: StreamId, page: PageSetup) -> PlotResult<()> {
        self.on(stream, Call::SetPage(page))
    }

    fn set_option(&self, stream: StreamId, option: &str, value: &str) -> PlotResult<()> {
        self.on(
            stream,
            Call::SetOption {
                option: option.to_string(),
                value: value.to_string(),
            },
        )
    }

    fn set_orientation(&self, stream: StreamId, orientation: i32) -> PlotResult<()> {
        self.on(stream, Call::SetOrientation(orientation))
    }

    fn set_pen_width(&self, stream: StreamId, width: f64) -> PlotResult<()> {
        self.on(stream, Call::SetPenWidth(width))
    }

    fn set_color_output(&self, stream: StreamId, enabled: bool) -> PlotResult<()> {
        self.on(stream, Call::SetColorOutput(enabled))
    }

    fn set_background(&self, stream: StreamId, r: i32, g: i32, b: i32) -> PlotResult<()> {
        self.on(stream, Call::SetBackground { r, g, b })
    }

    fn set_family(
        &self,
        stream: StreamId,
        enabled: i32,
        number: i32,
        max_bytes: i32,
    ) -> PlotResult<()> {
        self.on(
            stream,
            Call::SetFamily {
                enabled,
                number,
                max_bytes,
            },
        )
    }

    fn set_pause(&self, stream: StreamId, pause: bool) -> PlotResult<()> {
        self.on(stream, Call::SetPause(pause))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_are_distinct() {
        let backend = RecordingBackend::new();
        let a = backend.allocate_stream().unwrap();
        let b = backend.allocate_stream().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_current_stream_follows_last_target() {
        let backend = RecordingBackend::new();
        let a = backend.allocate_stream().unwrap();
        let b = backend.allocate_stream().unwrap();
        backend.init(b).unwrap();
        assert_eq!(backend.current_stream().unwrap(), b);
        backend.advance(a, 0).unwrap();
        assert_eq!(backend.current_stream().unwrap(), a);
    }

    #[test]
    fn test_fail_next_is_one_shot() {
        let backend = RecordingBackend::new();
        let id = backend.allocate_stream().unwrap();
        backend.fail_next("device error");
        let err = backend.init(id).unwrap_err();
        assert_eq!(err.to_string(), "device error");
        assert!(backend.init(id).is_ok());
        assert_eq!(backend.calls_for(id), vec![Call::Init]);
    }

    #[test]
    fn test_clones_share_log() {
        let backend = RecordingBackend::new();
        let other = backend.clone();
        let id = other.allocate_stream().unwrap();
        other.color0(id, 2).unwrap();
        assert_eq!(
            backend.last_call(),
            Some(Recorded {
                stream: Some(id),
                call: Call::Color0 { index: 2 }
            })
        );
    }
}
