mod adapter;
mod errors;
mod similarity;

pub use adapter::{EmbeddingAdapter, Neighbor};
pub use errors::{EmbedResult, Error};
pub use similarity::{average, cosine_similarity};
