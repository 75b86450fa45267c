//! Route handlers organized by resource

pub mod bookstore;
pub mod cars;
pub mod dealers;
pub mod health;
pub mod salespeople;
