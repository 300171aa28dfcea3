//! Reading the input table and summarising its columns.

pub mod loader;
pub mod summary;

pub use loader::{parse_date, DataLoader, LoadedData, RawTable};
pub use summary::{column_info, describe, infer_dtype, null_counts, ColumnInfo, ColumnStats, DType};
