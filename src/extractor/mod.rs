pub mod region;
pub mod sheet_extractor;
pub mod table;

pub use region::{column_index, column_label, Region};
pub use sheet_extractor::{SheetExtractor, SOURCE_DESCRIPTION_COLUMN, SOURCE_PATH_COLUMN};
pub use table::{CellValue, Table};
