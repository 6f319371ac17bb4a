//! Rolling-window statistics.

use crate::error::{MathError, MathResult};

/// Lazy sliding-window sample standard deviation.
///
/// Yields `(index, std)` where `index` is the position of the last
/// observation in the window. The first `window - 1` positions have no full
/// window and are skipped, so the first item has index `window - 1`.
#[derive(Debug, Clone)]
pub struct RollingStd<'a> {
    values: &'a [f64],
    window: usize,
    end: usize,
}

/// Creates a rolling standard deviation over `values`.
///
/// Requires `2 <= window <= values.len()`.
pub fn rolling_std(values: &[f64], window: usize) -> MathResult<RollingStd<'_>> {
    if window < 2 {
        return Err(MathError::invalid_input(format!(
            "rolling window must be at least 2, got {window}"
        )));
    }
    if window > values.len() {
        return Err(MathError::insufficient_data(window, values.len()));
    }
    Ok(RollingStd {
        values,
        window,
        end: window - 1,
    })
}

impl RollingStd<'_> {
    /// Window length.
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }
}

impl Iterator for RollingStd<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.end >= self.values.len() {
            return None;
        }
        let slice = &self.values[self.end + 1 - self.window..=self.end];
        let n = slice.len() as f64;
        let m = slice.iter().sum::<f64>() / n;
        let ss: f64 = slice.iter().map(|x| (x - m).powi(2)).sum();
        let item = (self.end, (ss / (n - 1.0)).sqrt());
        self.end += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.values.len().saturating_sub(self.end);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RollingStd<'_> {}
