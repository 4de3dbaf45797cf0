//! The master table: append, load and export.

pub mod export;
mod loader;
pub mod table;
pub mod xlsx;

pub use export::{export, ExportFormat, ExportPayload};
pub use loader::load_master;
pub use table::{
    MasterTable, COMPLETION_TIME_COLUMN, CREATION_TIME_COLUMN, ID_COLUMN, SYSTEM_COLUMNS,
};
