// Similarity engine: row measures and the K x K topic similarity matrix.

pub mod matrix;
pub mod measure;

pub use matrix::{similarity_matrix, AlignmentBasis, SimilarityMatrix};
pub use measure::{cosine_similarity, total_variation_similarity, SimilarityMeasure};
