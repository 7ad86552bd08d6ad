pub mod app;
pub mod catalog;
pub mod cinemeta;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod output;
pub mod store;
