// src/blockchain/mod.rs

pub mod amount;
pub mod client;
pub mod models;
pub mod planner;
pub mod registry;
pub mod services;

pub use client::RpcClient;
pub use planner::Planner;
pub use registry::{AddressBook, TokenRecord, TokenRegistry};
