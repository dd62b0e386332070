pub mod geometry;
pub mod text;
pub mod tree;
