//! External Identities
//!
//! Records owned by the surrounding commerce platform. They only ever appear
//! here as query parameters, so each is represented by its identifier alone.

use crate::uuids::TypedUuid;

/// Customer
#[derive(Debug)]
pub struct Customer;

/// Customer UUID
pub type CustomerUuid = TypedUuid<Customer>;

/// Product catalog version
#[derive(Debug)]
pub struct CatalogVersion;

/// Catalog Version UUID
pub type CatalogVersionUuid = TypedUuid<CatalogVersion>;

/// Coupon redemption
#[derive(Debug)]
pub struct Redemption;

/// Redemption UUID
pub type RedemptionUuid = TypedUuid<Redemption>;
