pub mod annotate;
pub mod eval;
pub mod score;
