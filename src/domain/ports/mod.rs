pub mod event_repository;
pub mod link_policy;
