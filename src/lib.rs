pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod schemas;
pub mod services;
pub mod state;
