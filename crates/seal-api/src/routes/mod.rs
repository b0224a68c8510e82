//! # Route Modules
//!
//! One router per resource, merged in [`crate::app`].

pub mod distributions;
pub mod lots;
pub mod sectors;
pub mod seals;
