pub mod cli;
pub mod conf;
pub mod filesystem;
pub mod honeypot;
pub mod logging;
pub mod logs;
pub mod plugin;
