pub mod catalog;
pub mod error;
pub mod events;
pub mod locks;
pub mod ports;
pub mod repo;
pub mod service;
pub mod slots;
