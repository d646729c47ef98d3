pub mod handoff_routes;
pub mod server;
