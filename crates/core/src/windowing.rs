//! Viewport windowing for a grid of fixed-height rows.
//!
//! Items are grouped into rows of `column_count`, the rows visible at the
//! current scroll offset are widened by an overscan margin, and a
//! [`LoadMoreTrigger`] decides when the window has come close enough to the
//! end of the loaded data to ask for the next page.
//!
//! Every function here is total: empty lists, zero heights, and zero-sized
//! viewports all produce a well-formed (possibly empty) window.

use std::ops::Range;

use serde::Serialize;

/// Row height estimate used by the directory grid, in pixels.
pub const DEFAULT_ROW_HEIGHT: u32 = 132;

/// Rows rendered beyond each edge of the visible range.
pub const DEFAULT_OVERSCAN: usize = 5;

/// Cards per grid row.
pub const DEFAULT_COLUMN_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Row grouping
// ---------------------------------------------------------------------------

/// Number of rows needed for `item_count` items, `ceil(items / columns)`.
///
/// A zero column count is treated as one column.
pub fn row_count(item_count: usize, column_count: usize) -> usize {
    item_count.div_ceil(column_count.max(1))
}

/// Item indices that belong to `row`; the final row may be partial.
pub fn row_items(row: usize, item_count: usize, column_count: usize) -> Range<usize> {
    let columns = column_count.max(1);
    let start = row.saturating_mul(columns).min(item_count);
    let end = start.saturating_add(columns).min(item_count);
    start..end
}

// ---------------------------------------------------------------------------
// Window computation
// ---------------------------------------------------------------------------

/// Geometry the window is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowInput {
    pub row_count: usize,
    /// Estimated height of every row.
    pub row_height: u32,
    pub viewport_height: u32,
    /// Distance scrolled from the top of the list.
    pub scroll_offset: u64,
    pub overscan: usize,
}

/// Placement of one rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowDescriptor {
    pub index: usize,
    /// Distance from the top of the list to the top of this row.
    pub offset: u64,
    pub height: u32,
}

/// Rows to render for the current scroll position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ViewportWindow {
    /// Rendered rows in ascending index order, overscan included.
    pub rows: Vec<RowDescriptor>,
    /// Rows actually intersecting the viewport.
    pub visible: Range<usize>,
    /// Height of the whole list, `row_count * row_height`.
    pub total_height: u64,
    pub row_count: usize,
}

impl ViewportWindow {
    /// Index of the last rendered row, if any row is rendered.
    pub fn last_rendered(&self) -> Option<usize> {
        self.rows.last().map(|r| r.index)
    }

    /// Range of rendered row indices.
    pub fn rendered(&self) -> Range<usize> {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => first.index..last.index + 1,
            _ => 0..0,
        }
    }
}

/// Compute which rows are visible and which are rendered.
///
/// The first visible row is `scroll_offset / row_height`; the last is the
/// row containing the final pixel of the viewport. Rendered rows extend
/// `overscan` rows beyond both, clamped to `[0, row_count - 1]`.
pub fn compute_window(input: WindowInput) -> ViewportWindow {
    let row_height = u64::from(input.row_height);
    let total_height = row_height.saturating_mul(input.row_count as u64);

    if input.row_count == 0 || row_height == 0 || input.viewport_height == 0 {
        return ViewportWindow {
            total_height,
            row_count: input.row_count,
            ..ViewportWindow::default()
        };
    }

    let last_row = input.row_count - 1;
    let viewport_end = input
        .scroll_offset
        .saturating_add(u64::from(input.viewport_height));

    let first_visible = clamp_row(input.scroll_offset / row_height, last_row);
    let last_visible = clamp_row(viewport_end.div_ceil(row_height).saturating_sub(1), last_row)
        .max(first_visible);

    let start = first_visible.saturating_sub(input.overscan);
    let end = last_visible.saturating_add(input.overscan).min(last_row);

    let rows = (start..=end)
        .map(|index| RowDescriptor {
            index,
            offset: index as u64 * row_height,
            height: input.row_height,
        })
        .collect();

    ViewportWindow {
        rows,
        visible: first_visible..last_visible + 1,
        total_height,
        row_count: input.row_count,
    }
}

fn clamp_row(row: u64, last_row: usize) -> usize {
    usize::try_from(row).map_or(last_row, |r| r.min(last_row))
}

// ---------------------------------------------------------------------------
// Load-more trigger
// ---------------------------------------------------------------------------

/// Everything the "need more data" decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerInput {
    /// Filter generation the loaded records belong to.
    pub epoch: u64,
    pub last_rendered: Option<usize>,
    pub row_count: usize,
    pub overscan: usize,
    pub loaded: usize,
    pub total: u64,
    /// An incremental fetch is already in flight.
    pub fetching_more: bool,
    /// The first page for the current filters has arrived.
    pub initial_loaded: bool,
}

impl TriggerInput {
    fn near_edge(&self) -> bool {
        match self.last_rendered {
            Some(last) if self.row_count > 0 => {
                last.saturating_add(self.overscan) >= self.row_count - 1
            }
            _ => false,
        }
    }

    fn eligible(&self) -> bool {
        (self.loaded as u64) < self.total && !self.fetching_more && self.initial_loaded
    }

    fn key(&self) -> (u64, usize, u64) {
        (self.epoch, self.loaded, self.total)
    }
}

/// Edge-triggered "need more data" signal.
///
/// Fires once per distinct `(epoch, loaded, total)` condition while the
/// window sits near the end of the list. Recomputing at the same position
/// does not fire again; moving away from the edge re-arms it, and so does
/// any change to the loaded count, the total, or the filter epoch.
#[derive(Debug, Default)]
pub struct LoadMoreTrigger {
    fired_for: Option<(u64, usize, u64)>,
}

impl LoadMoreTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the trigger; `true` means "fetch the next page now".
    pub fn evaluate(&mut self, input: TriggerInput) -> bool {
        if !input.near_edge() {
            self.fired_for = None;
            return false;
        }
        if !input.eligible() || self.fired_for == Some(input.key()) {
            return false;
        }
        self.fired_for = Some(input.key());
        true
    }

    /// Forget the last firing, e.g. after the list was replaced.
    pub fn reset(&mut self) {
        self.fired_for = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
