//! Concrete background jobs dispatched by the controller.

pub mod items_match_job;
pub mod match_job;
pub mod preview_job;
