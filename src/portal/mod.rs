//! Navigation of the portal's client-rendered search form.

pub mod context;
pub mod errors;
pub mod navigator;
pub mod selectors;

pub use context::SearchContext;
pub use errors::ScrapeError;
pub use navigator::{CourseCard, FormNavigator, WaitConfig};
