//! Headless data grid
//!
//! [`Grid`] holds the rows of one entity table together with the state an
//! admin screen needs around them: pending edits, undo history, selections,
//! drag-fill, the filter/sort/page view and layout preferences. It renders
//! nothing itself; a front end reads its view and feeds it input.

mod changes;
mod config;
mod drag;
mod events;
mod export;
mod history;
mod notice;
mod persistence;
mod pipeline;
mod selection;
mod table;
mod virtualize;

pub use changes::*;
pub use config::*;
pub use drag::*;
pub use events::*;
pub use export::Export;
pub use export::export_filename;
pub use export::slug;
pub use export::to_csv;
pub use export::to_spreadsheet_xml;
pub use history::*;
pub use notice::*;
pub use persistence::*;
pub use pipeline::*;
pub use selection::*;
pub use table::*;
pub use virtualize::*;
