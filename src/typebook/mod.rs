//! Registry of the six Holland (RIASEC) interest categories.
//!
//! Each category carries a display name, a description, the skills it
//! recommends and the keyword list used to classify questionnaire items.
//! The registry is immutable once built; the standard one is compiled in.

mod category;
mod profiles;

pub use category::Category;
pub use profiles::{CategoryProfile, KeywordSet, TypeBook};
