//! Background Tasks Module
//!
//! Contains background tasks that keep a shared cache consistent over time.
//!
//! # Tasks
//! - Expiration: fires due TTL checks as their deadlines arrive

mod expiration;

pub use expiration::spawn_expiration_task;
