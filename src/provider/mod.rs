//! Questionnaire providers.
//!
//! A provider supplies the ordered `{id, text}` records the snapshot is built
//! from. The upstream payload is parsed into [`ProviderRecord`] at the
//! boundary; anything that does not fit the schema fails as
//! `ProviderUnavailable` instead of leaking half-filled records downstream.

mod base;
mod careernet;
mod fixture;

pub use base::{parse_questions_payload, ProviderRecord, QuestionProvider, DEFAULT_GROUP};
pub use careernet::CareerNetProvider;
pub use fixture::{FileProvider, StaticProvider};
