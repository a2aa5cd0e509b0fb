//! Tripvoice: turns short Chinese voice transcripts into structured intents.
//!
//! A trip utterance becomes a [`types::TripIntent`] (destination, dates,
//! budget, party size, interests); an expense question becomes a
//! [`types::ExpenseQueryIntent`] (category and date range). Parsing is a
//! pure function of the text and the current date.
//!
//! See `DESIGN.md` for the module layout.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod extractors;
pub mod form;
pub mod logging;
pub mod server;
pub mod transcript;
pub mod types;
