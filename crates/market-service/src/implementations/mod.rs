//! Concrete collaborator implementations wired by the service binary.

pub mod contract;
