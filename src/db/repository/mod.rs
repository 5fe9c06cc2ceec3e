//! Repository layer: document operations over the `patients` table.

mod patient;

pub use patient::*;
