pub mod assets;
pub mod dividends;
pub mod quote;
pub mod summary;
pub mod ui;
