//! Salon booking server: configuration, database wiring and the HTTP edge
//! around the appointments module.

pub mod app;
pub mod ingress;
pub mod shutdown;
