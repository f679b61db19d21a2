pub mod cluster;
pub mod fuse;
pub mod ingest;
pub mod pipeline;
pub mod rank;
