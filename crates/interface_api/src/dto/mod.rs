//! Request and response bodies
//!
//! Request types carry `validator` rules for the structural checks (ranges,
//! lengths, email shape) and convert into domain values. Response types
//! flatten money into decimal amounts plus one currency code.

pub mod product;
pub mod quote;
pub mod special_request;
