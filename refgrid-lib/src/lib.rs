//! Reference data grid library
//!
//! An async, headless engine for editing reference-data tables (hospitals,
//! notifications) held by a REST backend: fetch, filter, sort, paginate,
//! drag-fill, undo/redo and batched saves, with per-table layout settings.

pub mod backend;
pub mod entities;
pub mod error;
pub mod grid;
pub mod model;
pub mod settings;

pub use backend::CrudBackend;
pub use error::Error;
pub use grid::Grid;
pub use model::Entity;
