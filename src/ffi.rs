// Raw declarations of the PLplot C API used by the native backend.
// Linking is set up in build.rs.

#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_int};

pub type PLINT = c_int;
pub type PLFLT = f64;

/// plgver writes at most 80 bytes including the terminator
pub const VERSION_BUFFER_LEN: usize = 80;

unsafe extern "C" {
    pub fn c_plmkstrm(p_strm: *mut PLINT);
    pub fn c_plsstrm(strm: PLINT);
    pub fn c_plgstrm(p_strm: *mut PLINT);
    pub fn c_plgver(p_ver: *mut c_char);
    pub fn c_plend();
    pub fn c_plend1();
    pub fn c_plinit();

    pub fn c_pladv(page: PLINT);
    pub fn c_plbox(
        xopt: *const c_char,
        xtick: PLFLT,
        nxsub: PLINT,
        yopt: *const c_char,
        ytick: PLFLT,
        nysub: PLINT,
    );
    pub fn c_plbox3(
        xopt: *const c_char,
        xlabel: *const c_char,
        xtick: PLFLT,
        nxsub: PLINT,
        yopt: *const c_char,
        ylabel: *const c_char,
        ytick: PLFLT,
        nysub: PLINT,
        zopt: *const c_char,
        zlabel: *const c_char,
        ztick: PLFLT,
        nzsub: PLINT,
    );
    pub fn c_plcol0(icol0: PLINT);
    pub fn c_plenv(xmin: PLFLT, xmax: PLFLT, ymin: PLFLT, ymax: PLFLT, just: PLINT, axis: PLINT);
    pub fn c_plfontld(fnt: PLINT);
    pub fn c_pljoin(x1: PLFLT, y1: PLFLT, x2: PLFLT, y2: PLFLT);
    pub fn c_pllab(xlabel: *const c_char, ylabel: *const c_char, tlabel: *const c_char);
    pub fn c_plline(n: PLINT, x: *const PLFLT, y: *const PLFLT);
    pub fn c_plpoin(n: PLINT, x: *const PLFLT, y: *const PLFLT, code: PLINT);
    pub fn c_plssub(nx: PLINT, ny: PLINT);
    pub fn c_plstyl(nms: PLINT, mark: *const PLINT, space: *const PLINT);
    pub fn c_plsyax(digmax: PLINT, digits: PLINT);
    pub fn c_plvsta();
    pub fn c_plwind(xmin: PLFLT, xmax: PLFLT, ymin: PLFLT, ymax: PLFLT);

    pub fn c_plsdev(devname: *const c_char);
    pub fn c_plsfnam(fnam: *const c_char);
    pub fn c_plspage(xp: PLFLT, yp: PLFLT, xleng: PLINT, yleng: PLINT, xoff: PLINT, yoff: PLINT);
    pub fn c_plsetopt(opt: *const c_char, optarg: *const c_char) -> PLINT;
    pub fn c_plsori(ori: PLINT);
    pub fn c_plwidth(width: PLFLT);
    pub fn c_plscolor(color: PLINT);
    pub fn c_plscolbg(r: PLINT, g: PLINT, b: PLINT);
    pub fn c_plsfam(fam: PLINT, num: PLINT, bmax: PLINT);
    pub fn c_plspause(pause: PLINT);
}
