// Topic modeling: the engine trait, the shared summarizer, and the two
// engines that plug into it.

pub mod download;
pub mod embeddings;
pub mod keywords;
pub mod summary;
pub mod traits;
