//! Services Layer
//!
//! Business logic extracted from HTTP handlers. Services only talk to the
//! repository traits, so they run unchanged against any store implementation.

pub mod equipment_service;
pub mod inventory_service;
pub mod lending_service;
