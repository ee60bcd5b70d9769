pub mod audit;
pub mod blob;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod db;
pub mod dto;
pub mod email;
pub mod entity;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod pricing;
pub mod response;
pub mod routes;
pub mod services;
pub mod shipping;
pub mod slug;
pub mod state;
