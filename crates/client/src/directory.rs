//! Controller and viewport kept in step.
//!
//! [`DirectoryView`] owns a [`PaginationController`], the scroll geometry and
//! a [`LoadMoreTrigger`]. Every state change ends in [`settle`], which
//! recomputes the window, asks the trigger whether the end of the list is in
//! reach, fetches the next page if so, and repeats until the trigger stays
//! quiet. The resulting [`Frame`] is what presentation draws.
//!
//! [`settle`]: DirectoryView::settle

use std::ops::Range;

use userdir_core::filter::FilterCriteria;
use userdir_core::windowing::{
    compute_window, row_count, row_items, LoadMoreTrigger, RowDescriptor, TriggerInput,
    ViewportWindow, WindowInput, DEFAULT_COLUMN_COUNT, DEFAULT_OVERSCAN, DEFAULT_ROW_HEIGHT,
};

use crate::controller::{DirectorySnapshot, FetchOutcome, PaginationController};
use crate::error::ClientError;
use crate::service::QueryService;

/// Viewport geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    /// Height of one grid row in pixels.
    pub row_height: u32,
    /// Extra rows rendered above and below the visible ones.
    pub overscan: usize,
    /// Cards per row.
    pub column_count: usize,
    pub viewport_height: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
            column_count: DEFAULT_COLUMN_COUNT,
            viewport_height: 800,
        }
    }
}

/// A rendered grid row and the records it shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub row: RowDescriptor,
    /// Indices into `snapshot.records`.
    pub items: Range<usize>,
}

/// Everything presentation needs to draw one frame.
#[derive(Debug, Clone)]
pub struct Frame<R> {
    pub snapshot: DirectorySnapshot<R>,
    pub window: ViewportWindow,
    pub rows: Vec<RenderedRow>,
    pub scroll_offset: u64,
}

impl<R> Frame<R> {
    /// Records in rendered rows, top to bottom.
    pub fn rendered_records(&self) -> impl Iterator<Item = &R> {
        self.rows
            .iter()
            .flat_map(|row| self.snapshot.records[row.items.clone()].iter())
    }
}

/// A paginated directory seen through a scrolling viewport.
pub struct DirectoryView<Q: QueryService> {
    controller: PaginationController<Q>,
    config: ViewConfig,
    scroll_offset: u64,
    trigger: LoadMoreTrigger,
}

impl<Q: QueryService> DirectoryView<Q> {
    pub fn new(service: Q, config: ViewConfig) -> Self {
        Self {
            controller: PaginationController::new(service),
            config,
            scroll_offset: 0,
            trigger: LoadMoreTrigger::new(),
        }
    }

    pub fn controller(&self) -> &PaginationController<Q> {
        &self.controller
    }

    pub fn config(&self) -> ViewConfig {
        self.config
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    /// Apply new criteria, jump back to the top and settle.
    pub async fn apply_filters(
        &mut self,
        criteria: FilterCriteria,
    ) -> Result<Frame<Q::Record>, ClientError> {
        self.controller.apply_filters(criteria).await?;
        self.scroll_offset = 0;
        self.trigger.reset();
        Ok(self.settle().await)
    }

    /// Retry a failed initial load, then settle.
    pub async fn retry_initial_load(&mut self) -> Result<Frame<Q::Record>, ClientError> {
        self.controller.retry_initial_load().await?;
        self.scroll_offset = 0;
        self.trigger.reset();
        Ok(self.settle().await)
    }

    /// Scroll to `offset` pixels from the top, then settle.
    pub async fn scroll_to(&mut self, offset: u64) -> Frame<Q::Record> {
        self.scroll_offset = offset;
        self.settle().await
    }

    /// Change the viewport height, then settle.
    pub async fn resize(&mut self, viewport_height: u32) -> Frame<Q::Record> {
        self.config.viewport_height = viewport_height;
        self.settle().await
    }

    /// Fetch the next page directly (presentation "load more" callback).
    pub async fn fetch_next_page(&mut self) -> (FetchOutcome, Frame<Q::Record>) {
        let outcome = self.controller.fetch_next_page().await;
        (outcome, self.settle().await)
    }

    /// Recompute the window and fetch pages until the trigger stays quiet.
    pub async fn settle(&mut self) -> Frame<Q::Record> {
        loop {
            let snapshot = self.controller.snapshot().await;
            let window = self.window_for(&snapshot);

            let fire = self.trigger.evaluate(TriggerInput {
                epoch: snapshot.epoch,
                last_rendered: window.last_rendered(),
                row_count: window.row_count,
                overscan: self.config.overscan,
                loaded: snapshot.records.len(),
                total: snapshot.total_matching,
                fetching_more: snapshot.is_loading_more,
                initial_loaded: snapshot.initial_loaded && !snapshot.is_loading_initial,
            });

            if !fire {
                return self.frame(snapshot, window);
            }

            tracing::debug!(
                loaded = snapshot.records.len(),
                total = snapshot.total_matching,
                "Viewport reached the end of the list",
            );
            let outcome = self.controller.fetch_next_page().await;
            tracing::trace!(?outcome, "Load-more fetch settled");
        }
    }

    fn window_for(&self, snapshot: &DirectorySnapshot<Q::Record>) -> ViewportWindow {
        compute_window(WindowInput {
            row_count: row_count(snapshot.records.len(), self.config.column_count),
            row_height: self.config.row_height,
            viewport_height: self.config.viewport_height,
            scroll_offset: self.scroll_offset,
            overscan: self.config.overscan,
        })
    }

    fn frame(&self, snapshot: DirectorySnapshot<Q::Record>, window: ViewportWindow) -> Frame<Q::Record> {
        let items = snapshot.records.len();
        let rows = window
            .rows
            .iter()
            .map(|row| RenderedRow {
                row: *row,
                items: row_items(row.index, items, self.config.column_count),
            })
            .collect();

        Frame {
            snapshot,
            window,
            rows,
            scroll_offset: self.scroll_offset,
        }
    }
}
