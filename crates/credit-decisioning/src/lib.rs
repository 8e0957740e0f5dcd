//! Credit bureau normalization and loan eligibility decisioning.
//!
//! Raw bureau payloads are reduced to a canonical [`workflows::bureau::CreditReport`],
//! income evidence is reconciled by [`workflows::income`], and
//! [`workflows::eligibility::EligibilityEngine`] turns both into an
//! [`workflows::eligibility::EligibilityAssessment`] for the case-management layer.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
