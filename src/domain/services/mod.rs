pub mod clustering;
pub mod fusion;
pub mod geo;
pub mod scoring;
pub mod similarity;
pub mod text;
