//! API endpoint handlers, one module per resource.

pub mod appointments;
pub mod chat;
pub mod diagnosis;
pub mod health;
pub mod medications;
pub mod patients;
pub mod timeline;
