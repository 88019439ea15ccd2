//! Immutable widget geometry and stacking rank.

use crate::error::{WidgetError, WidgetResult};
use chrono::{DateTime, Utc};
use kurbo::{Point, Rect, Size};
use serde::Deserialize;

/// Snapshot of a widget's position, size, z-index and last modification time.
///
/// A layout is never edited in place. Every change builds a new value that
/// replaces the old one wholesale, so readers always see a coherent geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    position: Point,
    size: Size,
    z_index: i64,
    updated_at: DateTime<Utc>,
}

impl Layout {
    /// Create a validated layout.
    ///
    /// Coordinates must be finite, the size strictly positive and the z-index
    /// non-negative.
    pub fn new(
        position: Point,
        size: Size,
        z_index: i64,
        updated_at: DateTime<Utc>,
    ) -> WidgetResult<Self> {
        check_coordinate("x", position.x)?;
        check_coordinate("y", position.y)?;
        check_extent("width", size.width)?;
        check_extent("height", size.height)?;
        check_z_index(z_index)?;

        Ok(Self {
            position,
            size,
            z_index,
            updated_at,
        })
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// Stacking rank; lower values sit below higher ones.
    pub fn z_index(&self) -> i64 {
        self.z_index
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Axis-aligned bounds from `position` to `position + size`.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Build the layout that results from applying `patch` on top of this one.
    ///
    /// Fields absent from the patch keep their current value. The timestamp is
    /// always replaced, even when the patch is empty.
    pub fn merge(&self, patch: &LayoutPatch, updated_at: DateTime<Utc>) -> WidgetResult<Self> {
        patch.validate()?;
        Ok(self.overlay(patch, updated_at))
    }

    /// Same as [`Layout::merge`] for a patch that already passed validation.
    pub(crate) fn overlay(&self, patch: &LayoutPatch, updated_at: DateTime<Utc>) -> Self {
        Self {
            position: Point::new(
                patch.x.unwrap_or(self.position.x),
                patch.y.unwrap_or(self.position.y),
            ),
            size: Size::new(
                patch.width.unwrap_or(self.size.width),
                patch.height.unwrap_or(self.size.height),
            ),
            z_index: patch.z_index.unwrap_or(self.z_index),
            updated_at,
        }
    }

    /// Copy of this layout moved to another rank.
    ///
    /// Callers guarantee `z_index` is non-negative.
    pub(crate) fn with_z_index(&self, z_index: i64, updated_at: DateTime<Utc>) -> Self {
        debug_assert!(z_index >= 0);
        Self {
            z_index,
            updated_at,
            ..*self
        }
    }
}

/// Partial layout change. Unset fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPatch {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub z_index: Option<i64>,
}

impl LayoutPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn with_y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = Some(z_index);
        self
    }

    /// Check whether the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.z_index.is_none()
    }

    /// Validate every field that is present.
    ///
    /// A valid patch overlaid on a valid layout always yields a valid layout.
    pub fn validate(&self) -> WidgetResult<()> {
        if let Some(x) = self.x {
            check_coordinate("x", x)?;
        }
        if let Some(y) = self.y {
            check_coordinate("y", y)?;
        }
        if let Some(width) = self.width {
            check_extent("width", width)?;
        }
        if let Some(height) = self.height {
            check_extent("height", height)?;
        }
        if let Some(z_index) = self.z_index {
            check_z_index(z_index)?;
        }
        Ok(())
    }
}

pub(crate) fn check_coordinate(name: &str, value: f64) -> WidgetResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(WidgetError::invalid(format!("{name} must be a finite number, got {value}")))
    }
}

fn check_extent(name: &str, value: f64) -> WidgetResult<()> {
    check_coordinate(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(WidgetError::invalid(format!("{name} must be greater than zero, got {value}")))
    }
}

fn check_z_index(z_index: i64) -> WidgetResult<()> {
    if z_index >= 0 {
        Ok(())
    } else {
        Err(WidgetError::invalid(format!("zIndex can't be negative, got {z_index}")))
    }
}
