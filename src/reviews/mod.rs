//! The review table and the readers that produce it.

pub mod reader;
pub mod table;

pub use reader::{read_table, InputFormat};
pub use table::ReviewTable;
