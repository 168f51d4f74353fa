// Comment data: the row model and the spreadsheet loader.

pub mod loader;
pub mod record;
