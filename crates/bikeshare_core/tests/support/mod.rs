#![allow(dead_code)]

pub mod processes;
pub mod sinks;
