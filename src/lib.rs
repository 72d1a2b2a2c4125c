pub mod api;
pub mod app;
pub mod cli;
pub mod collections;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod observer;
pub mod services;
pub mod state;
