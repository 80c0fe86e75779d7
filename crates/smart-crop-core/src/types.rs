//! Shared data model for the smart-crop pipeline.

use serde::{Deserialize, Serialize};

/// Reading layout. Selected by the active configuration profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Single focal dialogue box (horizontal lines).
    Adv,
    /// Multiple paragraphs distributed across the screen (horizontal lines).
    Nvl,
}

/// Orientation of the text being detected. Distinct from `Mode`: ADV/NVL pick
/// *which* groups are selected, orientation picks *how* lines are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Dimensions of the raw screen bitmap handed to a request.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// The frame rescaled so `max(w, h) <= 960` and both dimensions are
/// multiples of 32, as required by the textness network's input contract.
#[derive(Debug, Clone, Copy)]
pub struct ResizedFrame {
    pub target_w: u32,
    pub target_h: u32,
    pub scale_x: f64,
    pub scale_y: f64,
}

/// Per-pixel textness score in `[0, 1]`, same shape as a `ResizedFrame`.
#[derive(Debug, Clone)]
pub struct Heatmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl Heatmap {
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }
}

/// A connected-component bounding rectangle plus the geometric features the
/// rest of the pipeline needs. Contour points are stored flat, not nested.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    /// Flat list of `(x, y)` points on the originating contour, used only to
    /// compute bounding-rectangle unions during merging.
    pub contour_points: Vec<(i32, i32)>,
}

impl Candidate {
    pub fn aspect(&self) -> f64 {
        self.w as f64 / self.h as f64
    }

    pub fn center_x(&self) -> f64 {
        self.x as f64 + self.w as f64 / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y as f64 + self.h as f64 / 2.0
    }

    pub fn area(&self) -> f64 {
        self.w as f64 * self.h as f64
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }
}

/// Ordered set of candidates forming a line (horizontal) or column (vertical).
#[derive(Debug, Clone, Default)]
pub struct Group(pub Vec<Candidate>);

/// Group produced by density clustering (NVL mode).
#[derive(Debug, Clone, Default)]
pub struct Paragraph(pub Vec<Candidate>);

/// Running estimate of the typical character size, in pixels, of the
/// currently-running title. Process-wide, bounded-history streaming median.
#[derive(Debug, Clone)]
pub struct ScaleTracker {
    history: Vec<f64>,
}

const MAX_HISTORY: usize = 10;

impl Default for ScaleTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScaleTracker {
    pub fn new() -> Self {
        Self {
            history: Vec::with_capacity(MAX_HISTORY),
        }
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Running median of `history`, or `-1.0` if no values have been
    /// accepted yet.
    pub fn typical_h(&self) -> f64 {
        median(&self.history)
    }

    /// Appends `value` to the bounded FIFO, dropping the oldest entry once
    /// the history exceeds [`MAX_HISTORY`].
    pub fn commit(&mut self, value: f64) {
        self.history.push(value);
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
    }
}

pub(crate) fn median(data: &[f64]) -> f64 {
    if data.is_empty() {
        return -1.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Last accepted dialogue's top-left coordinate, in resized-frame space.
#[derive(Debug, Clone, Copy)]
pub struct AnchorPos {
    pub x: f64,
    pub y: f64,
}

impl Default for AnchorPos {
    fn default() -> Self {
        Self { x: -1.0, y: -1.0 }
    }
}

impl AnchorPos {
    pub fn is_set(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Final rectangle, mapped back to the original frame's pixel coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OutputBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Result of a single `compute` call: the selected boxes (possibly empty) and
/// a scale value pending commit once the recognizer confirms real text.
#[derive(Debug, Clone, Default)]
pub struct CropResult {
    pub boxes: Vec<OutputBox>,
    pub pending_scale: Option<f64>,
}

impl CropResult {
    pub fn empty() -> Self {
        Self::default()
    }
}
