//! Persistence, services and wiring for e-stamp quotas and promotion
//! eligibility.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod logging;
pub mod presentation;

#[cfg(test)]
mod test;
