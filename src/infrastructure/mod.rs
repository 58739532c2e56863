pub mod host;
pub mod main_thread;
pub mod services;
pub mod storage;
pub mod worker;
