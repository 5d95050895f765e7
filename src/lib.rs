pub mod config;
pub mod directory;
pub mod feed;
pub mod map;
pub mod search;
pub mod session;
pub mod tracking;
