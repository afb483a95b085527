pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{category_header, category_icon, error, header, info, section, success, summary_row, warn};
pub use table::{categories_table, records_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
