//! Group box annotation models.
//!
//! The server returns annotations as a list of frames, each frame a list
//! of box records. Records are stored as raw JSON and carried as-is;
//! nothing here reorders, validates, renames or indexes them. [`GroupBox`]
//! is a read-only view for display code.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// All frames of group boxes for one video.
pub type GroupAnnotations = Vec<Frame>;

/// Raw box records belonging to a single frame.
pub type Frame = Vec<Value>;

/// Borrowed view over one raw group box record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupBox<'a> {
    raw: &'a Value,
}

impl<'a> GroupBox<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    /// View every box of a frame.
    pub fn in_frame(frame: &'a Frame) -> impl Iterator<Item = GroupBox<'a>> + 'a {
        frame.iter().map(GroupBox::new)
    }

    /// The record exactly as received.
    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    /// Group identifier, in whatever JSON type the server used.
    pub fn id(&self) -> Option<&'a Value> {
        self.field(&["id"])
    }

    /// Raw bounding box payload.
    pub fn bbox(&self) -> Option<&'a Value> {
        self.field(&["bbox", "bounding_box"])
    }

    /// Frame number, from a JSON number or a numeric string.
    pub fn frame_no(&self) -> Option<f64> {
        match self.field(&["frameNo", "frameNumber", "frame_number"])? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the bbox as a rectangle, if it has a recognizable shape.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bbox().and_then(BoundingBox::from_value)
    }

    fn field(&self, keys: &[&str]) -> Option<&'a Value> {
        let map = self.raw.as_object()?;
        keys.iter().find_map(|k| map.get(*k))
    }
}

/// A pixel-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X coordinate of the top-left corner
    pub x: f64,
    /// Y coordinate of the top-left corner
    pub y: f64,
    /// Width of the rectangle
    pub width: f64,
    /// Height of the rectangle
    pub height: f64,
}

impl BoundingBox {
    /// Create a new rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Best-effort read of a raw bbox payload.
    ///
    /// Accepts `[x1, y1, x2, y2]` corner arrays and
    /// `{x, y, width|w, height|h}` objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) if items.len() == 4 => {
                let c: Vec<f64> = items.iter().filter_map(Value::as_f64).collect();
                if c.len() != 4 {
                    return None;
                }
                Some(Self::new(c[0], c[1], c[2] - c[0], c[3] - c[1]))
            }
            Value::Object(map) => {
                let get = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k)?.as_f64());
                Some(Self::new(
                    get(&["x"])?,
                    get(&["y"])?,
                    get(&["width", "w"])?,
                    get(&["height", "h"])?,
                ))
            }
            _ => None,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Width and height are both positive.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}
