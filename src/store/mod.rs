//! Random-access reading of archived messages.

pub mod reader;
