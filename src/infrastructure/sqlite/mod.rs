pub mod event_repo;
pub mod migrations;
