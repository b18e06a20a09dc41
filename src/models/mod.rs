pub mod job;
pub mod print;
