//! Use-case services orchestrating repositories and the content registry.

pub mod well_service;
