// Comment Topics: spreadsheet comments in, topic-labeled HTML out
//
// This is the library root. Each module corresponds to one stage of the
// load -> normalize -> fit -> label -> render pipeline.

pub mod comments;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod text;
pub mod topics;

#[cfg(feature = "web")]
pub mod web;
