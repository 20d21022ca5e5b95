pub mod codec;
pub mod config;
pub mod data_models;
pub mod pager;
pub mod persistence;
pub mod session;
pub mod transport;
