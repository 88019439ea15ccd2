//! Wire representation of widgets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use widgetboard_core::{Widget, WidgetId};

/// A widget as returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDto {
    pub guid: WidgetId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<&Widget> for WidgetDto {
    fn from(widget: &Widget) -> Self {
        let layout = widget.layout();
        Self {
            guid: widget.id(),
            x: layout.x(),
            y: layout.y(),
            width: layout.width(),
            height: layout.height(),
            z_index: layout.z_index(),
            updated_at: layout.updated_at(),
        }
    }
}

impl From<Widget> for WidgetDto {
    fn from(widget: Widget) -> Self {
        Self::from(&widget)
    }
}
