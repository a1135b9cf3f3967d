//! Estamp
//!
//! Account quota aggregation, promotion eligibility and e-stamp tier rules for
//! loyalty promotions. This crate performs no I/O; persistence lives in
//! `estamp-app`.

pub mod accounts;
pub mod cleanup;
pub mod eligibility;
pub mod fixtures;
pub mod identity;
pub mod promotions;
pub mod quotas;
pub mod rewards;
pub mod tiers;
pub mod uuids;
