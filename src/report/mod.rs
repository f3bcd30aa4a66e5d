//! Output surfaces for a finished [`Analysis`](crate::analysis::Analysis): a terminal
//! table, a standalone HTML report and a JSON export.

mod html;
mod json;
mod terminal;

pub use html::{render_html, write_html};
pub use json::{to_json, write_json};
pub use terminal::{format_distribution, format_review_table, DistributionRow, MAX_CELL_WIDTH};
