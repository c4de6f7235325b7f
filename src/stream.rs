//! Per-stream handle over the plotting backend.
//!
//! A `PlStream` is a drawable: instantiate it, then invoke the plotting API
//! on it. Every method targets this handle's stream id; the caller never has
//! to switch the library's current stream by hand.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::backend::{Axis3, PageSetup, PlotBackend, StreamId};
use crate::error::{PlotError, PlotResult};
use crate::options::StreamOptions;

pub struct PlStream {
    stream_id: StreamId,
    backend: Arc<dyn PlotBackend>,
}

impl fmt::Debug for PlStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlStream")
            .field("stream_id", &self.stream_id)
            .finish_non_exhaustive()
    }
}

impl PlStream {
    /// Allocate a new stream in `backend`
    pub fn new(backend: Arc<dyn PlotBackend>) -> PlotResult<Self> {
        let stream_id = backend.allocate_stream()?;
        debug!("Allocated stream {}", stream_id);
        Ok(Self { stream_id, backend })
    }

    /// Id assigned at construction
    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub fn advance_page(&self, page: i32) -> PlotResult<()> {
        trace!(stream = %self.stream_id, page, "adv");
        self.backend.advance(self.stream_id, page)
    }

    /// Draw a box around the current viewport with axes, ticks and labels
    /// as selected by the option strings
    pub fn draw_box(
        &self,
        x_options: &str,
        x_tick: f64,
        x_subticks: i32,
        y_options: &str,
        y_tick: f64,
        y_subticks: i32,
    ) -> PlotResult<()> {
        trace!(stream = %self.stream_id, x_options, y_options, "box");
        self.backend.draw_box(
            self.stream_id,
            x_options,
            x_tick,
            x_subticks,
            y_options,
            y_tick,
            y_subticks,
        )
    }

    pub fn draw_box3d(&self, x: Axis3<'_>, y: Axis3<'_>, z: Axis3<'_>) -> PlotResult<()> {
        trace!(stream = %self.stream_id, "box3");
        self.backend.draw_box3(self.stream_id, x, y, z)
    }

    /// Select a color from the cmap0 palette
    pub fn set_color(&self, color_index: i32) -> PlotResult<()> {
        trace!(stream = %self.stream_id, color_index, "col0");
        self.backend.color0(self.stream_id, color_index)
    }

    /// Finish this stream and release it in the backend.
    ///
    /// Other streams stay open. Consumes the handle.
    pub fn end(self) -> PlotResult<()> {
        debug!("Ending stream {}", self.stream_id);
        self.backend.end(self.stream_id)
    }

    pub fn set_environment(
        &self,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        justify: i32,
        axis_style: i32,
    ) -> PlotResult<()> {
        trace!(stream = %self.stream_id, x_min, x_max, y_min, y_max, "env");
        self.backend
            .environment(self.stream_id, x_min, x_max, y_min, y_max, justify, axis_style)
    }

    pub fn load_font(&self, font_id: i32) -> PlotResult<()> {
        trace!(stream = %self.stream_id, font_id, "fontld");
        self.backend.load_font(self.stream_id, font_id)
    }

    /// The library-wide current stream.
    ///
    /// This is global state of the backend and need not be this handle's
    /// id; use [`PlStream::stream_id`] for that.
    pub fn current_stream_id(&self) -> PlotResult<StreamId> {
        self.backend.current_stream()
    }

    pub fn init(&self) -> PlotResult<()> {
        debug!("Initializing stream {}", self.stream_id);
        self.backend.init(self.stream_id)
    }

    pub fn draw_line_segment(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> PlotResult<()> {
        trace!(stream = %self.stream_id, x1, y1, x2, y2, "join");
        self.backend.join(self.stream_id, x1, y1, x2, y2)
    }

    /// Single-precision variant of [`PlStream::draw_line_segment`]
    pub fn draw_line_segment_f32(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> PlotResult<()> {
        self.draw_line_segment(x1.into(), y1.into(), x2.into(), y2.into())
    }

    pub fn set_labels(&self, x_label: &str, y_label: &str, title: &str) -> PlotResult<()> {
        trace!(stream = %self.stream_id, x_label, y_label, title, "lab");
        self.backend.labels(self.stream_id, x_label, y_label, title)
    }

    /// Draw a line through the first `n` points of `x` and `y`
    pub fn draw_polyline(&self, n: usize, x: &[f64], y: &[f64]) -> PlotResult<()> {
        let (x, y) = first_n(n, x, y)?;
        trace!(stream = %self.stream_id, n, "line");
        self.backend.line(self.stream_id, x, y)
    }

    /// Mark the first `n` points of `x` and `y` with glyph `symbol_code`
    pub fn draw_points(&self, n: usize, x: &[f64], y: &[f64], symbol_code: i32) -> PlotResult<()> {
        let (x, y) = first_n(n, x, y)?;
        trace!(stream = %self.stream_id, n, symbol_code, "poin");
        self.backend.points(self.stream_id, x, y, symbol_code)
    }

    pub fn set_subpages(&self, nx: i32, ny: i32) -> PlotResult<()> {
        trace!(stream = %self.stream_id, nx, ny, "ssub");
        self.backend.subpages(self.stream_id, nx, ny)
    }

    /// Broken-line style: `num_marks` repetitions of a mark/space pair
    /// (lengths in micrometers); zero marks restores a continuous line
    pub fn set_symbol_style(
        &self,
        num_marks: i32,
        mark_length: i32,
        space_length: i32,
    ) -> PlotResult<()> {
        trace!(stream = %self.stream_id, num_marks, mark_length, space_length, "styl");
        self.backend.line_style(self.stream_id, num_marks, mark_length, space_length)
    }

    pub fn set_axis_label_digits(&self, max_digits: i32, digits: i32) -> PlotResult<()> {
        trace!(stream = %self.stream_id, max_digits, digits, "syax");
        self.backend.y_axis_digits(self.stream_id, max_digits, digits)
    }

    /// Standard viewport for the current subpage (`plvsta`)
    pub fn advance_to_start_of_page(&self) -> PlotResult<()> {
        trace!(stream = %self.stream_id, "vsta");
        self.backend.standard_viewport(self.stream_id)
    }

    pub fn set_window(&self, x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> PlotResult<()> {
        trace!(stream = %self.stream_id, x_min, x_max, y_min, y_max, "wind");
        self.backend.window(self.stream_id, x_min, x_max, y_min, y_max)
    }

    /// Forward configured stream options to the backend. Call before `init`.
    pub fn apply_options(&self, options: &StreamOptions) -> PlotResult<()> {
        let id = self.stream_id;
        let backend = &self.backend;

        if let Some(device) = &options.device {
            backend.set_device(id, device)?;
        }
        if let Some(file) = &options.output_file {
            backend.set_output_file(id, file)?;
        }
        if let Some(geometry) = options.geometry {
            backend.set_page(
                id,
                PageSetup {
                    xdpi: 0.0,
                    ydpi: 0.0,
                    width: geometry.width,
                    height: geometry.height,
                    x_offset: geometry.x_offset,
                    y_offset: geometry.y_offset,
                },
            )?;
        }
        if let Some(aspect) = options.aspect {
            backend.set_option(id, "a", &aspect.to_string())?;
        }
        if let Some(orientation) = options.orientation {
            backend.set_orientation(id, orientation)?;
        }
        if let Some(width) = options.pen_width {
            backend.set_pen_width(id, width)?;
        }
        if options.color {
            backend.set_color_output(id, true)?;
        }
        if let Some(bg) = options.background {
            backend.set_background(id, bg.r.into(), bg.g.into(), bg.b.into())?;
        }
        if options.family {
            backend.set_family(id, 1, -1, -1)?;
        }
        if let Some(max_bytes) = options.family_file_bytes()? {
            backend.set_family(id, -1, -1, max_bytes)?;
        }
        if options.no_pause {
            backend.set_pause(id, false)?;
        }
        if options.subpages_x.is_some() || options.subpages_y.is_some() {
            // Non-positive counts leave that direction unchanged
            backend.subpages(
                id,
                options.subpages_x.unwrap_or(-1),
                options.subpages_y.unwrap_or(-1),
            )?;
        }
        if let Some(bufmax) = options.bufmax {
            backend.set_option(id, "bufmax", &bufmax.to_string())?;
        }
        let server = [
            ("plserver", &options.server_name),
            ("plwindow", &options.window_name),
            ("tcl_cmd", &options.tcl_command),
            ("auto_path", &options.auto_path),
        ];
        for (option, value) in server {
            if let Some(value) = value {
                backend.set_option(id, option, value)?;
            }
        }

        debug!("Applied options to stream {}", id);
        Ok(())
    }
}

/// Trim both coordinate slices to `n` points, refusing to read past either
fn first_n<'a>(n: usize, x: &'a [f64], y: &'a [f64]) -> PlotResult<(&'a [f64], &'a [f64])> {
    match (x.get(..n), y.get(..n)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(PlotError::LengthMismatch {
            requested: n,
            x_len: x.len(),
            y_len: y.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Geometry, Rgb};
    use crate::recording::{Call, RecordedAxis, RecordingBackend};

    fn setup() -> (RecordingBackend, PlStream) {
        let backend = RecordingBackend::new();
        let stream = PlStream::new(Arc::new(backend.clone())).unwrap();
        backend.clear();
        (backend, stream)
    }

    fn last(backend: &RecordingBackend, stream: &PlStream) -> Call {
        let recorded = backend.last_call().expect("no call recorded");
        assert_eq!(recorded.stream, Some(stream.stream_id()));
        recorded.call
    }

    #[test]
    fn test_stream_id_comes_from_allocation() {
        let backend = RecordingBackend::new();
        let stream = PlStream::new(Arc::new(backend.clone())).unwrap();
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].call, Call::AllocateStream(stream.stream_id()));

        let before = stream.stream_id();
        stream.init().unwrap();
        stream.set_color(3).unwrap();
        assert_eq!(stream.stream_id(), before);
    }

    #[test]
    fn test_sequential_streams_are_distinct() {
        let backend = Arc::new(RecordingBackend::new());
        let a = PlStream::new(backend.clone()).unwrap();
        let b = PlStream::new(backend).unwrap();
        assert_ne!(a.stream_id(), b.stream_id());
    }

    #[test]
    fn test_allocation_failure_propagates() {
        let backend = RecordingBackend::new();
        backend.fail_next("no free stream");
        let err = PlStream::new(Arc::new(backend)).unwrap_err();
        assert!(matches!(err, PlotError::Backend(ref m) if m == "no free stream"));
    }

    #[test]
    fn test_forwards_arguments_unmodified() {
        let (backend, pls) = setup();

        pls.advance_page(3).unwrap();
        assert_eq!(last(&backend, &pls), Call::Advance { page: 3 });

        pls.draw_box("bcnst", 0.5, 2, "bcnstv", 1.25, 4).unwrap();
        assert_eq!(
            last(&backend, &pls),
            Call::Box {
                x_options: "bcnst".into(),
                x_tick: 0.5,
                x_subticks: 2,
                y_options: "bcnstv".into(),
                y_tick: 1.25,
                y_subticks: 4,
            }
        );

        pls.set_color(15).unwrap();
        assert_eq!(last(&backend, &pls), Call::Color0 { index: 15 });

        pls.set_environment(-1.0, 1.0, -2.0, 2.0, 1, 2).unwrap();
        assert_eq!(
            last(&backend, &pls),
            Call::Environment {
                x_min: -1.0,
                x_max: 1.0,
                y_min: -2.0,
                y_max: 2.0,
                justify: 1,
                axis: 2,
            }
        );

        pls.load_font(1).unwrap();
        assert_eq!(last(&backend, &pls), Call::LoadFont { font: 1 });

        pls.init().unwrap();
        assert_eq!(last(&backend, &pls), Call::Init);

        pls.draw_line_segment(0.1, 0.2, 0.3, 0.4).unwrap();
        assert_eq!(
            last(&backend, &pls),
            Call::Join {
                x1: 0.1,
                y1: 0.2,
                x2: 0.3,
                y2: 0.4
            }
        );

        pls.set_labels("x", "y", "title").unwrap();
        assert_eq!(
            last(&backend, &pls),
            Call::Labels {
                x_label: "x".into(),
                y_label: "y".into(),
                title: "title".into(),
            }
        );

        pls.set_subpages(2, 3).unwrap();
        assert_eq!(last(&backend, &pls), Call::Subpages { nx: 2, ny: 3 });

        pls.set_symbol_style(1, 1500, 800).unwrap();
        assert_eq!(
            last(&backend, &pls),
            Call::LineStyle {
                marks: 1,
                mark: 1500,
                space: 800
            }
        );

        pls.set_axis_label_digits(5, 2).unwrap();
        assert_eq!(
            last(&backend, &pls),
            Call::YAxisDigits {
                max_digits: 5,
                digits: 2
            }
        );

        pls.advance_to_start_of_page().unwrap();
        assert_eq!(last(&backend, &pls), Call::StandardViewport);

        pls.set_window(0.0, 10.0, -5.0, 5.0).unwrap();
        assert_eq!(
            last(&backend, &pls),
            Call::Window {
                x_min: 0.0,
                x_max: 10.0,
                y_min: -5.0,
                y_max: 5.0
            }
        );
    }

    #[test]
    fn test_box3d_forwards_all_axes() {
        let (backend, pls) = setup();
        pls.draw_box3d(
            Axis3::new("bnstu", "x axis", 0.0, 0),
            Axis3::new("bnstu", "y axis", 0.5, 2),
            Axis3::new("bcdmnstuv", "z axis", 1.0, 4),
        )
        .unwrap();

        let axis = |options: &str, label: &str, tick: f64, subticks: i32| RecordedAxis {
            options: options.into(),
            label: label.into(),
            tick,
            subticks,
        };
        assert_eq!(
            last(&backend, &pls),
            Call::Box3 {
                x: axis("bnstu", "x axis", 0.0, 0),
                y: axis("bnstu", "y axis", 0.5, 2),
                z: axis("bcdmnstuv", "z axis", 1.0, 4),
            }
        );
    }

    #[test]
    fn test_single_precision_segment_widens_exactly() {
        let (backend, pls) = setup();
        pls.draw_line_segment_f32(0.1, 0.2, 0.3, 0.4).unwrap();
        assert_eq!(
            last(&backend, &pls),
            Call::Join {
                x1: f64::from(0.1f32),
                y1: f64::from(0.2f32),
                x2: f64::from(0.3f32),
                y2: f64::from(0.4f32),
            }
        );
    }

    #[test]
    fn test_polyline_reads_only_n_points() {
        let (backend, pls) = setup();
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 20.0, 30.0, 40.0, 50.0];

        pls.draw_polyline(3, &x, &y).unwrap();
        assert_eq!(
            last(&backend, &pls),
            Call::Line {
                x: vec![1.0, 2.0, 3.0],
                y: vec![10.0, 20.0, 30.0],
            }
        );

        pls.draw_points(2, &x, &y, 9).unwrap();
        assert_eq!(
            last(&backend, &pls),
            Call::Points {
                x: vec![1.0, 2.0],
                y: vec![10.0, 20.0],
                code: 9,
            }
        );
    }

    #[test]
    fn test_polyline_refuses_short_data() {
        let (backend, pls) = setup();
        let err = pls.draw_polyline(4, &[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            PlotError::LengthMismatch {
                requested: 4,
                x_len: 4,
                y_len: 2
            }
        ));
        assert!(pls.draw_points(1, &[], &[1.0], 1).is_err());
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_zero_points_forwards_empty_slices() {
        let (backend, pls) = setup();
        pls.draw_points(0, &[1.0], &[2.0], 3).unwrap();
        assert_eq!(
            last(&backend, &pls),
            Call::Points {
                x: vec![],
                y: vec![],
                code: 3
            }
        );
    }

    #[test]
    fn test_end_forwarded_exactly_once() {
        let (backend, pls) = setup();
        let id = pls.stream_id();

        pls.init().unwrap();
        pls.set_environment(0.0, 1.0, 0.0, 1.0, 0, 0).unwrap();
        pls.draw_polyline(2, &[0.0, 1.0], &[0.0, 1.0]).unwrap();
        pls.advance_page(0).unwrap();
        assert!(!backend.calls_for(id).contains(&Call::End));

        pls.end().unwrap();
        let ends = backend
            .calls_for(id)
            .into_iter()
            .filter(|c| *c == Call::End)
            .count();
        assert_eq!(ends, 1);
    }

    #[test]
    fn test_end_targets_only_this_stream() {
        let backend = Arc::new(RecordingBackend::new());
        let a = PlStream::new(backend.clone()).unwrap();
        let b = PlStream::new(backend.clone()).unwrap();
        let (a_id, b_id) = (a.stream_id(), b.stream_id());

        a.end().unwrap();
        assert_eq!(backend.calls_for(a_id), vec![Call::End]);
        assert!(backend.calls_for(b_id).is_empty());
        b.init().unwrap();
    }

    #[test]
    fn test_current_stream_is_backend_global() {
        let backend = Arc::new(RecordingBackend::new());
        let a = PlStream::new(backend.clone()).unwrap();
        let b = PlStream::new(backend.clone()).unwrap();

        b.init().unwrap();
        // Asking through `a` reports whichever stream the backend last used
        assert_eq!(a.current_stream_id().unwrap(), b.stream_id());
        a.init().unwrap();
        assert_eq!(b.current_stream_id().unwrap(), a.stream_id());
    }

    #[test]
    fn test_backend_errors_pass_through() {
        let (backend, pls) = setup();
        backend.fail_next("plinit: unknown device");
        let err = pls.init().unwrap_err();
        assert_eq!(err.to_string(), "plinit: unknown device");
    }

    #[test]
    fn test_apply_options_forwards_setters_in_order() {
        let (backend, pls) = setup();
        let options = StreamOptions {
            device: Some("svg".into()),
            output_file: Some("out.svg".into()),
            geometry: Some(Geometry {
                width: 400,
                height: 300,
                x_offset: 10,
                y_offset: 20,
            }),
            aspect: Some(1.5),
            orientation: Some(1),
            pen_width: Some(2.0),
            color: true,
            background: Some(Rgb {
                r: 0xFF,
                g: 0xFF,
                b: 0,
            }),
            family: true,
            family_file_size_mb: Some(2.0),
            no_pause: true,
            subpages_x: Some(2),
            subpages_y: None,
            bufmax: Some(4096),
            server_name: Some("plserver".into()),
            window_name: None,
            tcl_command: Some("wm withdraw .".into()),
            auto_path: None,
        };
        pls.apply_options(&options).unwrap();

        assert_eq!(
            backend.calls_for(pls.stream_id()),
            vec![
                Call::SetDevice("svg".into()),
                Call::SetOutputFile("out.svg".into()),
                Call::SetPage(PageSetup {
                    xdpi: 0.0,
                    ydpi: 0.0,
                    width: 400,
                    height: 300,
                    x_offset: 10,
                    y_offset: 20,
                }),
                Call::SetOption {
                    option: "a".into(),
                    value: "1.5".into()
                },
                Call::SetOrientation(1),
                Call::SetPenWidth(2.0),
                Call::SetColorOutput(true),
                Call::SetBackground {
                    r: 255,
                    g: 255,
                    b: 0
                },
                Call::SetFamily {
                    enabled: 1,
                    number: -1,
                    max_bytes: -1
                },
                Call::SetFamily {
                    enabled: -1,
                    number: -1,
                    max_bytes: 2_000_000
                },
                Call::SetPause(false),
                Call::Subpages { nx: 2, ny: -1 },
                Call::SetOption {
                    option: "bufmax".into(),
                    value: "4096".into()
                },
                Call::SetOption {
                    option: "plserver".into(),
                    value: "plserver".into()
                },
                Call::SetOption {
                    option: "tcl_cmd".into(),
                    value: "wm withdraw .".into()
                },
            ]
        );
    }

    #[test]
    fn test_default_options_forward_nothing() {
        let (backend, pls) = setup();
        pls.apply_options(&StreamOptions::default()).unwrap();
        assert!(backend.calls().is_empty());
    }
}
