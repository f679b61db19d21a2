pub mod category;
pub mod cluster_id;
pub mod entities;
pub mod score;
pub mod sentiment;
pub mod source;
