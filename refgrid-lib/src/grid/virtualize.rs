//! Viewport windowing
//!
//! Only rows intersecting the scroll viewport (plus an overscan margin) are
//! rendered; the skipped rows above and below are replaced by padding so the
//! scrollable height stays the same.

use std::ops::Range;

/// The visible part of the scroll container, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub scroll_offset: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(scroll_offset: u32, height: u32) -> Self {
        Self {
            scroll_offset,
            height,
        }
    }
}

/// Rows to render and the padding standing in for the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualWindow {
    /// Indices into the current page.
    pub range: Range<usize>,
    pub padding_top: u64,
    pub padding_bottom: u64,
    /// Height of every row on the page combined.
    pub total_height: u64,
}

impl VirtualWindow {
    /// Every row, no padding.
    pub fn full(row_count: usize, row_height: u32) -> Self {
        Self {
            range: 0..row_count,
            padding_top: 0,
            padding_bottom: 0,
            total_height: row_count as u64 * row_height as u64,
        }
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Computes the window for `row_count` rows of `row_height` pixels.
///
/// With `enabled` false the window covers every row.
pub fn window(
    row_count: usize,
    row_height: u32,
    viewport: Viewport,
    overscan: usize,
    enabled: bool,
) -> VirtualWindow {
    if !enabled {
        return VirtualWindow::full(row_count, row_height);
    }
    if row_count == 0 || row_height == 0 {
        return VirtualWindow::full(0, row_height);
    }

    let height = row_height as u64;
    let total_height = row_count as u64 * height;
    let first_visible = ((viewport.scroll_offset / row_height) as usize).min(row_count - 1);
    let visible_count = viewport.height.div_ceil(row_height) as usize;

    let start = first_visible.saturating_sub(overscan);
    let end = (first_visible + visible_count + overscan).min(row_count);

    VirtualWindow {
        range: start..end,
        padding_top: start as u64 * height,
        padding_bottom: (row_count - end) as u64 * height,
        total_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_renders_everything() {
        let window = window(120, 25, Viewport::new(900, 300), 5, false);
        assert_eq!(window.range, 0..120);
        assert_eq!(window.padding_top, 0);
        assert_eq!(window.padding_bottom, 0);
        assert_eq!(window.total_height, 3000);
    }

    #[test]
    fn test_window_with_overscan() {
        let window = window(200, 25, Viewport::new(1000, 250), 5, true);
        // rows 40..50 visible
        assert_eq!(window.range, 35..55);
        assert_eq!(window.padding_top, 35 * 25);
        assert_eq!(window.padding_bottom, 145 * 25);
        assert_eq!(
            window.padding_top + window.len() as u64 * 25 + window.padding_bottom,
            window.total_height
        );
    }

    #[test]
    fn test_window_clamped_at_edges() {
        let top = window(30, 25, Viewport::new(0, 250), 50, true);
        assert_eq!(top.range, 0..30);
        assert_eq!(top.padding_bottom, 0);

        let past_end = window(30, 25, Viewport::new(10_000, 250), 2, true);
        assert_eq!(past_end.range, 27..30);
    }

    #[test]
    fn test_empty() {
        let window = window(0, 25, Viewport::new(0, 250), 50, true);
        assert!(window.is_empty());
        assert_eq!(window.total_height, 0);
    }
}
