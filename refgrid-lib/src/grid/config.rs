//! Grid configuration

use std::time::Duration;

/// Page sizes offered to the user.
pub const PAGE_SIZES: [usize; 5] = [10, 20, 50, 100, 200];

/// Static configuration of a grid instance.
///
/// Per-user preferences live in [`TableSettings`](crate::settings::TableSettings);
/// this holds what the embedding application decides.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Initial page size.
    pub page_size: usize,
    /// Rows rendered beyond each edge of the viewport when virtualizing.
    pub overscan: usize,
    /// Narrowest a column can be resized to, in pixels.
    pub min_column_width: u32,
    /// How long a notice stays visible.
    pub notice_lifetime: Duration,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            overscan: 50,
            min_column_width: 50,
            notice_lifetime: Duration::from_secs(3),
        }
    }
}

impl GridConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial page size.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets the virtualization overscan.
    pub fn overscan(mut self, rows: usize) -> Self {
        self.overscan = rows;
        self
    }

    /// Sets the minimum column width.
    pub fn min_column_width(mut self, width: u32) -> Self {
        self.min_column_width = width;
        self
    }

    /// Sets the notice lifetime.
    pub fn notice_lifetime(mut self, lifetime: Duration) -> Self {
        self.notice_lifetime = lifetime;
        self
    }
}
