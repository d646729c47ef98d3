pub mod common;
mod handoff_flow;
