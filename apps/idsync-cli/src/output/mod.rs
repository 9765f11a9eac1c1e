//! Terminal output helpers

mod printer;
pub mod table;

pub use printer::{print_batch, print_info, print_json_line, print_success, print_warning};
pub use table::truncate;
