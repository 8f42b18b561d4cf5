//! `mboxfreq`: who is filling up your mailbox archive?
//!
//! This crate scans an MBOX archive into a table of contents of message byte
//! ranges, then reports, per sender, the number of messages or their total
//! size.

pub mod config;
pub mod errlog;
pub mod error;
pub mod model;
pub mod parser;
pub mod progress;
pub mod report;
pub mod store;
