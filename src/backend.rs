//! Capability set of the plotting library.
//!
//! Every method maps to one native entry point and names its target stream
//! explicitly. Implementations decide how the stream gets selected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlotResult;

/// Identifier of a stream inside the backend (a PLINT on the C side)
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamId(pub i32);

impl StreamId {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for StreamId {
    fn from(id: i32) -> Self {
        StreamId(id)
    }
}

/// Option string, label and tick settings of one axis of a 3D box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis3<'a> {
    pub options: &'a str,
    pub label: &'a str,
    pub tick: f64,
    pub subticks: i32,
}

impl<'a> Axis3<'a> {
    pub fn new(options: &'a str, label: &'a str, tick: f64, subticks: i32) -> Self {
        Self {
            options,
            label,
            tick,
            subticks,
        }
    }
}

/// Page geometry handed to the page setter (dpi of 0 keeps the device default)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub xdpi: f64,
    pub ydpi: f64,
    pub width: i32,
    pub height: i32,
    pub x_offset: i32,
    pub y_offset: i32,
}

/// Native plotting entry points.
///
/// Coordinate slices passed to `line` and `points` always hold exactly the
/// number of points to draw; callers trim them beforehand.
pub trait PlotBackend: Send + Sync {
    /// Create a new stream and return its id (`plmkstrm`)
    fn allocate_stream(&self) -> PlotResult<StreamId>;

    /// Backend-global current stream (`plgstrm`)
    fn current_stream(&self) -> PlotResult<StreamId>;

    /// Library version string (`plgver`)
    fn version(&self) -> PlotResult<String>;

    /// Close every stream (`plend`)
    fn end_all(&self) -> PlotResult<()>;

    fn advance(&self, stream: StreamId, page: i32) -> PlotResult<()>;

    #[allow(clippy::too_many_arguments)]
    fn draw_box(
        &self,
        stream: StreamId,
        x_options: &str,
        x_tick: f64,
        x_subticks: i32,
        y_options: &str,
        y_tick: f64,
        y_subticks: i32,
    ) -> PlotResult<()>;

    fn draw_box3(
        &self,
        stream: StreamId,
        x: Axis3<'_>,
        y: Axis3<'_>,
        z: Axis3<'_>,
    ) -> PlotResult<()>;

    fn color0(&self, stream: StreamId, index: i32) -> PlotResult<()>;

    /// Release one stream (`plend1`)
    fn end(&self, stream: StreamId) -> PlotResult<()>;

    #[allow(clippy::too_many_arguments)]
    fn environment(
        &self,
        stream: StreamId,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        justify: i32,
        axis: i32,
    ) -> PlotResult<()>;

    fn load_font(&self, stream: StreamId, font: i32) -> PlotResult<()>;

    fn init(&self, stream: StreamId) -> PlotResult<()>;

    fn join(&self, stream: StreamId, x1: f64, y1: f64, x2: f64, y2: f64) -> PlotResult<()>;

    fn labels(&self, stream: StreamId, x_label: &str, y_label: &str, title: &str) -> PlotResult<()>;

    fn line(&self, stream: StreamId, x: &[f64], y: &[f64]) -> PlotResult<()>;

    fn points(&self, stream: StreamId, x: &[f64], y: &[f64], code: i32) -> PlotResult<()>;

    fn subpages(&self, stream: StreamId, nx: i32, ny: i32) -> PlotResult<()>;

    fn line_style(&self, stream: StreamId, marks: i32, mark: i32, space: i32) -> PlotResult<()>;

    fn y_axis_digits(&self, stream: StreamId, max_digits: i32, digits: i32) -> PlotResult<()>;

    fn standard_viewport(&self, stream: StreamId) -> PlotResult<()>;

    fn window(
        &self,
        stream: StreamId,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    ) -> PlotResult<()>;

    // Stream setup, used before `init`

    fn set_device(&self, stream: StreamId, device: &str) -> PlotResult<()>;

    fn set_output_file(&self, stream: StreamId, path: &str) -> PlotResult<()>;

    fn set_page(&self, stream: StreamId, page: PageSetup) -> PlotResult<()>;

    /// Pass one option/argument pair to the library's own option parser
    fn set_option(&self, stream: StreamId, option: &str, value: &str) -> PlotResult<()>;

    fn set_orientation(&self, stream: StreamId, orientation: i32) -> PlotResult<()>;

    fn set_pen_width(&self, stream: StreamId, width: f64) -> PlotResult<()>;

    fn set_color_output(&self, stream: StreamId, enabled: bool) -> PlotResult<()>;

    fn set_background(&self, stream: StreamId, r: i32, g: i32, b: i32) -> PlotResult<()>;

    /// Familying of output files; -1 leaves a field unchanged
    fn set_family(
        &self,
        stream: StreamId,
        enabled: i32,
        number: i32,
        max_bytes: i32,
    ) -> PlotResult<()>;

    fn set_pause(&self, stream: StreamId, pause: bool) -> PlotResult<()>;
}
