pub mod dirs;
pub mod logger;
