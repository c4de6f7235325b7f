//! Backend that forwards across the C ABI into libplplot.
//!
//! PLplot keeps a single process-global "current stream". Each call selects
//! the target stream and runs the entry point while holding `NATIVE_LOCK`,
//! so two handles used from different threads never interleave.

use std::ffi::CStr;
use std::os::raw::c_char;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::backend::{Axis3, PageSetup, PlotBackend, StreamId};
use crate::error::{PlotError, PlotResult};
use crate::ffi;
use crate::marshal::{c_string, plint_len, style_arrays};

static NATIVE_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }

    /// Run `f` with `stream` selected as the library's current stream
    fn on_stream<T>(&self, stream: StreamId, f: impl FnOnce() -> T) -> T {
        let _guard = NATIVE_LOCK.lock();
        unsafe { ffi::c_plsstrm(stream.get()) };
        f()
    }

    fn global<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = NATIVE_LOCK.lock();
        f()
    }
}

impl PlotBackend for NativeBackend {
    fn allocate_stream(&self) -> PlotResult<StreamId> {
        let mut id: ffi::PLINT = -1;
        self.global(|| unsafe { ffi::c_plmkstrm(&mut id) });
        if id < 0 {
            return Err(PlotError::Backend("plmkstrm: no free stream".to_string()));
        }
        Ok(StreamId(id))
    }

    fn current_stream(&self) -> PlotResult<StreamId> {
        let mut id: ffi::PLINT = 0;
        self.global(|| unsafe { ffi::c_plgstrm(&mut id) });
        Ok(StreamId(id))
    }

    fn version(&self) -> PlotResult<String> {
        let mut buf = [0 as c_char; ffi::VERSION_BUFFER_LEN];
        self.global(|| unsafe { ffi::c_plgver(buf.as_mut_ptr()) });
        let version = unsafe { CStr::from_ptr(buf.as_ptr()) };
        Ok(version.to_string_lossy().into_owned())
    }

    fn end_all(&self) -> PlotResult<()> {
        self.global(|| unsafe { ffi::c_plend() });
        Ok(())
    }

    fn advance(&self, stream: StreamId, page: i32) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_pladv(page) });
        Ok(())
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
        let xopt = c_string(x_options)?;
        let yopt = c_string(y_options)?;
        self.on_stream(stream, || unsafe {
            ffi::c_plbox(
                xopt.as_ptr(),
                x_tick,
                x_subticks,
                yopt.as_ptr(),
                y_tick,
                y_subticks,
            )
        });
        Ok(())
    }

    fn draw_box3(
        &self,
        stream: StreamId,
        x: Axis3<'_>,
        y: Axis3<'_>,
        z: Axis3<'_>,
    ) -> PlotResult<()> {
        let (xopt, xlabel) = (c_string(x.options)?, c_string(x.label)?);
        let (yopt, ylabel) = (c_string(y.options)?, c_string(y.label)?);
        let (zopt, zlabel) = (c_string(z.options)?, c_string(z.label)?);
        self.on_stream(stream, || unsafe {
            ffi::c_plbox3(
                xopt.as_ptr(),
                xlabel.as_ptr(),
                x.tick,
                x.subticks,
                yopt.as_ptr(),
                ylabel.as_ptr(),
                y.tick,
                y.subticks,
                zopt.as_ptr(),
                zlabel.as_ptr(),
                z.tick,
                z.subticks,
            )
        });
        Ok(())
    }

    fn color0(&self, stream: StreamId, index: i32) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plcol0(index) });
        Ok(())
    }

    fn end(&self, stream: StreamId) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plend1() });
        Ok(())
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
        self.on_stream(stream, || unsafe {
            ffi::c_plenv(x_min, x_max, y_min, y_max, justify, axis)
        });
        Ok(())
    }

    fn load_font(&self, stream: StreamId, font: i32) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plfontld(font) });
        Ok(())
    }

    fn init(&self, stream: StreamId) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plinit() });
        Ok(())
    }

    fn join(&self, stream: StreamId, x1: f64, y1: f64, x2: f64, y2: f64) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_pljoin(x1, y1, x2, y2) });
        Ok(())
    }

    fn labels(
        &self,
        stream: StreamId,
        x_label: &str,
        y_label: &str,
        title: &str,
    ) -> PlotResult<()> {
        let (x, y, t) = (c_string(x_label)?, c_string(y_label)?, c_string(title)?);
        self.on_stream(stream, || unsafe { ffi::c_pllab(x.as_ptr(), y.as_ptr(), t.as_ptr()) });
        Ok(())
    }

    fn line(&self, stream: StreamId, x: &[f64], y: &[f64]) -> PlotResult<()> {
        let n = plint_len(x.len().min(y.len()))?;
        self.on_stream(stream, || unsafe { ffi::c_plline(n, x.as_ptr(), y.as_ptr()) });
        Ok(())
    }

    fn points(&self, stream: StreamId, x: &[f64], y: &[f64], code: i32) -> PlotResult<()> {
        let n = plint_len(x.len().min(y.len()))?;
        self.on_stream(stream, || unsafe { ffi::c_plpoin(n, x.as_ptr(), y.as_ptr(), code) });
        Ok(())
    }

    fn subpages(&self, stream: StreamId, nx: i32, ny: i32) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plssub(nx, ny) });
        Ok(())
    }

    fn line_style(&self, stream: StreamId, marks: i32, mark: i32, space: i32) -> PlotResult<()> {
        let (mark_lengths, space_lengths) = style_arrays(marks, mark, space);
        self.on_stream(stream, || unsafe {
            ffi::c_plstyl(marks, mark_lengths.as_ptr(), space_lengths.as_ptr())
        });
        Ok(())
    }

    fn y_axis_digits(&self, stream: StreamId, max_digits: i32, digits: i32) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plsyax(max_digits, digits) });
        Ok(())
    }

    fn standard_viewport(&self, stream: StreamId) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plvsta() });
        Ok(())
    }

    fn window(
        &self,
        stream: StreamId,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    ) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plwind(x_min, x_max, y_min, y_max) });
        Ok(())
    }

    fn set_device(&self, stream: StreamId, device: &str) -> PlotResult<()> {
        let device = c_string(device)?;
        self.on_stream(stream, || unsafe { ffi::c_plsdev(device.as_ptr()) });
        Ok(())
    }

    fn set_output_file(&self, stream: StreamId, path: &str) -> PlotResult<()> {
        let path = c_string(path)?;
        self.on_stream(stream, || unsafe { ffi::c_plsfnam(path.as_ptr()) });
        Ok(())
    }

    fn set_page(&self, stream: StreamId, page: PageSetup) -> PlotResult<()> {
        self.on_stream(stream, || unsafe {
            ffi::c_plspage(
                page.xdpi,
                page.ydpi,
                page.width,
                page.height,
                page.x_offset,
                page.y_offset,
            )
        });
        Ok(())
    }

    fn set_option(&self, stream: StreamId, option: &str, value: &str) -> PlotResult<()> {
        let (opt, arg) = (c_string(option)?, c_string(value)?);
        let status =
            self.on_stream(stream, || unsafe { ffi::c_plsetopt(opt.as_ptr(), arg.as_ptr()) });
        if status != 0 {
            return Err(PlotError::Backend(format!(
                "plsetopt rejected -{} {}",
                option, value
            )));
        }
        Ok(())
    }

    fn set_orientation(&self, stream: StreamId, orientation: i32) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plsori(orientation) });
        Ok(())
    }

    fn set_pen_width(&self, stream: StreamId, width: f64) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plwidth(width) });
        Ok(())
    }

    fn set_color_output(&self, stream: StreamId, enabled: bool) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plscolor(enabled as ffi::PLINT) });
        Ok(())
    }

    fn set_background(&self, stream: StreamId, r: i32, g: i32, b: i32) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plscolbg(r, g, b) });
        Ok(())
    }

    fn set_family(
        &self,
        stream: StreamId,
        enabled: i32,
        number: i32,
        max_bytes: i32,
    ) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plsfam(enabled, number, max_bytes) });
        Ok(())
    }

    fn set_pause(&self, stream: StreamId, pause: bool) -> PlotResult<()> {
        self.on_stream(stream, || unsafe { ffi::c_plspause(pause as ffi::PLINT) });
        Ok(())
    }
}
