//! Personal task manager: account sign-up/sign-in and per-user task CRUD
//! over a JSON RPC interface, plus a typed client for that interface.

pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod memory;
pub mod rpc;
pub mod state;
pub mod tasks;
