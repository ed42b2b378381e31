//! # Domain Models
//!
//! Canonical types shared by every endpoint adapter.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`OrganizationCode`] | Validated 8 or 10 character organization code |
//! | [`RegistryDate`] | Calendar date as reported by a registry |
//! | [`Certificate`] | Digital-signature certificate record |
//! | [`LicenseSummary`] | Latest license expiry per module and kind |
//! | [`CompanyRecord`] | Company registry extract |
//! | [`Payload`] | Endpoint-specific data carried by a successful outcome |

mod org_code;
mod records;
mod registry_date;

pub use org_code::{OrganizationCode, VALID_CODE_LENGTHS};
pub use records::{Certificate, CompanyRecord, LicenseKind, LicenseSummary, Payload};
pub use registry_date::RegistryDate;
