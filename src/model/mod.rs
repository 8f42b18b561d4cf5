//! Core data model: table-of-contents entries and message views.

pub mod message;
pub mod toc;
