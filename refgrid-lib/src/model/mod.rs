//! Row model and entity contract

mod column;
mod entity;
mod row;
mod value;

pub use column::*;
pub use entity::*;
pub use row::*;
pub use value::*;
