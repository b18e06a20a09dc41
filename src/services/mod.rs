pub mod intake;
pub mod job_store;
pub mod memory_store;
pub mod printer;
pub mod reclaimer;
pub mod worker_pool;
