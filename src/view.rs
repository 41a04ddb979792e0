//! The visible time window over a waveform.

use serde::{Deserialize, Serialize};

use crate::types::SampleTime;
use crate::waveform::{SamplePoint, Waveform};

/// Width ratio applied by one zoom step.
pub const ZOOM_FACTOR: f64 = 1.5;

/// Pan direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanDirection {
    Left,
    Right,
}

/// A `[min, max]` slice of the time axis, kept inside `[0, len]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewWindow {
    pub min: SampleTime,
    pub max: SampleTime,
}

impl ViewWindow {
    /// The full window over a tape of `len` cycles.
    pub fn full(len: usize) -> Self {
        Self {
            min: 0.0,
            max: len as SampleTime,
        }
    }

    pub fn width(&self) -> SampleTime {
        self.max - self.min
    }

    pub fn center(&self) -> SampleTime {
        (self.min + self.max) / 2.0
    }

    /// Shows the whole tape again.
    pub fn reset(&mut self, len: usize) {
        *self = Self::full(len);
    }

    /// Narrows the window around its centre. Windows one cycle wide or
    /// narrower are left alone.
    pub fn zoom_in(&mut self) {
        let width = self.width();
        if width <= 1.0 {
            return;
        }
        let next = (width / ZOOM_FACTOR).max(1.0);
        let center = self.center();
        self.min = center - next / 2.0;
        self.max = center + next / 2.0;
    }

    /// Widens the window around its centre, never past `[0, len]`.
    pub fn zoom_out(&mut self, len: usize) {
        let total = len as SampleTime;
        let width = self.width();
        if width >= total {
            self.reset(len);
            return;
        }
        let next = (width * ZOOM_FACTOR).min(total);
        let center = self.center();
        let mut min = center - next / 2.0;
        let mut max = center + next / 2.0;
        if min < 0.0 {
            max -= min;
            min = 0.0;
        }
        if max > total {
            min -= max - total;
            max = total;
        }
        self.min = min.max(0.0);
        self.max = max;
    }

    /// Shifts the window by a quarter of its width, stopping at the data
    /// bounds without changing the width.
    pub fn pan(&mut self, direction: PanDirection, len: usize) {
        let total = len as SampleTime;
        let width = self.width();
        let shift = width / 4.0;
        match direction {
            PanDirection::Left => {
                self.min = (self.min - shift).max(0.0);
                self.max = self.min + width;
            }
            PanDirection::Right => {
                self.max = (self.max + shift).min(total);
                self.min = self.max - width;
            }
        }
    }

    pub fn contains(&self, time: SampleTime) -> bool {
        time >= self.min && time <= self.max
    }

    /// The samples of `waveform` inside the window.
    pub fn visible<'a>(&self, waveform: &'a Waveform) -> &'a [SamplePoint] {
        waveform.window(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_zoom_in_shrinks_around_center() {
        let mut view = ViewWindow::full(6);
        view.zoom_in();
        assert!(approx(view.width(), 4.0));
        assert!(approx(view.center(), 3.0));
        assert!(approx(view.min, 1.0));
    }

    #[test]
    fn test_zoom_in_stops_at_one_cycle() {
        let mut view = ViewWindow { min: 2.0, max: 3.2 };
        view.zoom_in();
        assert!(approx(view.width(), 1.0));
        let mut unit = ViewWindow { min: 3.0, max: 4.0 };
        unit.zoom_in();
        assert_eq!(unit, ViewWindow { min: 3.0, max: 4.0 });
    }

    #[test]
    fn test_zoom_out_restores_full_range() {
        let mut view = ViewWindow::full(8);
        view.zoom_out(8);
        assert_eq!(view, ViewWindow::full(8));

        let mut view = ViewWindow { min: 0.0, max: 2.0 };
        view.zoom_out(8);
        // widened to 3 and pushed back inside the data
        assert!(approx(view.min, 0.0));
        assert!(approx(view.max, 3.0));

        let mut view = ViewWindow { min: 6.0, max: 8.0 };
        view.zoom_out(8);
        assert!(approx(view.min, 5.0));
        assert!(approx(view.max, 8.0));
    }

    #[test]
    fn test_pan_clamps_and_keeps_width() {
        let mut view = ViewWindow { min: 2.0, max: 6.0 };
        view.pan(PanDirection::Left, 8);
        assert!(approx(view.min, 1.0));
        view.pan(PanDirection::Left, 8);
        assert!(approx(view.min, 0.0));
        assert!(approx(view.width(), 4.0));

        view.pan(PanDirection::Right, 8);
        view.pan(PanDirection::Right, 8);
        view.pan(PanDirection::Right, 8);
        view.pan(PanDirection::Right, 8);
        assert!(approx(view.max, 8.0));
        assert!(approx(view.min, 4.0));
    }

    #[test]
    fn test_contains() {
        let view = ViewWindow { min: 1.0, max: 2.0 };
        assert!(view.contains(1.0));
        assert!(view.contains(1.99));
        assert!(!view.contains(2.5));
    }
}
