//! Course-offering scraper for the CaneLink student portal.
//!
//! The portal renders its class search as a stateful client-side form inside
//! an iframe; results are course cards whose machine-readable content lives in
//! accessibility-label text fragments. This crate drives the form through a
//! WebDriver session, parses the fragments into typed section records, and
//! persists them to Postgres or CSV.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod driver;
pub mod export;
pub mod logging;
pub mod parse;
pub mod portal;
pub mod scraper;
pub mod utils;
