//! Rendered geometry of a marquee

use serde::{Deserialize, Serialize};

use super::config::Axis;

/// Sizes sampled from the rendered element, in CSS pixels
///
/// `content_*` is the scrollable size of the moving element and
/// `container_*` the visible viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasuredGeometry {
    pub content_width: f64,
    pub content_height: f64,
    pub container_width: f64,
    pub container_height: f64,
}

impl MeasuredGeometry {
    pub fn new(
        content_width: f64,
        content_height: f64,
        container_width: f64,
        container_height: f64,
    ) -> Self {
        Self {
            content_width,
            content_height,
            container_width,
            container_height,
        }
    }

    /// True when every measurement is positive, i.e. layout has happened
    pub fn is_ready(&self) -> bool {
        [
            self.content_width,
            self.content_height,
            self.container_width,
            self.container_height,
        ]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0)
    }

    /// Container size as `(width, height)`, the value the stability gate samples
    pub fn container_size(&self) -> (f64, f64) {
        (self.container_width, self.container_height)
    }

    pub fn content_extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.content_width,
            Axis::Vertical => self.content_height,
        }
    }

    pub fn container_extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.container_width,
            Axis::Vertical => self.container_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ready_requires_all_positive() {
        assert!(MeasuredGeometry::new(2000.0, 40.0, 500.0, 40.0).is_ready());
        assert!(!MeasuredGeometry::new(0.0, 40.0, 500.0, 40.0).is_ready());
        assert!(!MeasuredGeometry::new(2000.0, 0.0, 500.0, 40.0).is_ready());
        assert!(!MeasuredGeometry::new(2000.0, 40.0, 0.0, 40.0).is_ready());
        assert!(!MeasuredGeometry::new(2000.0, 40.0, 500.0, 0.0).is_ready());
        assert!(!MeasuredGeometry::default().is_ready());
    }

    #[test]
    fn test_extents_follow_axis() {
        let geometry = MeasuredGeometry::new(2000.0, 40.0, 500.0, 30.0);
        assert_eq!(geometry.content_extent(Axis::Horizontal), 2000.0);
        assert_eq!(geometry.content_extent(Axis::Vertical), 40.0);
        assert_eq!(geometry.container_extent(Axis::Horizontal), 500.0);
        assert_eq!(geometry.container_extent(Axis::Vertical), 30.0);
    }
}
