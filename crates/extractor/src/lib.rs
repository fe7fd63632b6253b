pub mod workbook;

pub use workbook::extract;
