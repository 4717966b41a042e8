pub mod add;
pub mod clear;
pub mod complete;
pub mod delete;
pub mod edit;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod show;
pub mod tui;
