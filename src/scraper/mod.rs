//! Search-space enumeration and run control.

pub mod harvester;
pub mod runner;

pub use harvester::{Harvester, Scope};
pub use runner::Runner;
