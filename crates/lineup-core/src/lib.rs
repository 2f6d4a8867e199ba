// Library root: roster matching, attendance resolution and team balancing.

pub mod clipboard;
pub mod config;
pub mod engine;
pub mod error;
pub mod player;
pub mod roster_csv;
pub mod service;
pub mod sink;
pub mod store;
