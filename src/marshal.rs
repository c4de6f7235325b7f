//! Conversions from safe Rust arguments to the shapes the C entry points take.

use std::ffi::CString;

use crate::error::{PlotError, PlotResult};

/// Most mark/space pairs `plstyl` accepts; larger counts are rejected by the
/// library before it reads the arrays.
pub(crate) const MAX_STYLE_PAIRS: usize = 10;

pub(crate) fn c_string(value: &str) -> PlotResult<CString> {
    Ok(CString::new(value)?)
}

/// Point count as the library's native integer
pub(crate) fn plint_len(len: usize) -> PlotResult<i32> {
    i32::try_from(len).map_err(|_| PlotError::TooManyPoints(len))
}

/// Mark and space arrays for `plstyl`, holding `marks` copies of the pair.
/// Capped at [`MAX_STYLE_PAIRS`] entries; the caller still forwards `marks`
/// unchanged so the library applies its own limit.
pub(crate) fn style_arrays(marks: i32, mark: i32, space: i32) -> (Vec<i32>, Vec<i32>) {
    let count = usize::try_from(marks).unwrap_or(0).min(MAX_STYLE_PAIRS);
    (vec![mark; count], vec![space; count])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_arrays_repeat_the_pair() {
        let (marks, spaces) = style_arrays(3, 1500, 750);
        assert_eq!(marks, vec![1500; 3]);
        assert_eq!(spaces, vec![750; 3]);
    }

    #[test]
    fn test_style_arrays_are_bounded() {
        let (marks, spaces) = style_arrays(i32::MAX, 1, 1);
        assert_eq!(marks.len(), MAX_STYLE_PAIRS);
        assert_eq!(spaces.len(), MAX_STYLE_PAIRS);

        let (marks, spaces) = style_arrays(-4, 1, 1);
        assert!(marks.is_empty() && spaces.is_empty());

        let (marks, _) = style_arrays(0, 1, 1);
        assert!(marks.is_empty());
    }

    #[test]
    fn test_plint_len_overflow() {
        assert_eq!(plint_len(60).unwrap(), 60);
        assert_eq!(plint_len(i32::MAX as usize).unwrap(), i32::MAX);

        let too_many = i32::MAX as usize + 1;
        let err = plint_len(too_many).unwrap_err();
        assert!(matches!(err, PlotError::TooManyPoints(n) if n == too_many));
    }

    #[test]
    fn test_c_string_rejects_interior_nul() {
        assert_eq!(c_string("bcnst").unwrap().as_bytes(), b"bcnst");
        assert!(matches!(
            c_string("bc\0nst"),
            Err(PlotError::InvalidString(_))
        ));
    }
}
