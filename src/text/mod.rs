// Text normalization: the language resource bundle and the comment normalizer.

pub mod normalizer;
pub mod resources;
