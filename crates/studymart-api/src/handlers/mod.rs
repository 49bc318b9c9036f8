//! Request handlers

pub mod health;
pub mod material;
pub mod payment;
pub mod student;
