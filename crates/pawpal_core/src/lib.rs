pub mod care_api;
pub mod config;
pub mod error;
pub mod model;
pub mod recurrence;
pub mod scheduler;
pub mod storage;
pub mod timestamp;
