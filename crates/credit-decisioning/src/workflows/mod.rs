pub mod address;
pub mod applications;
pub mod bureau;
pub mod eligibility;
pub mod income;
