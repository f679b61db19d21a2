pub mod event;
pub mod fused_record;
