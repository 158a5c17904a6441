//! MCP server module
//!
//! Exposes the Atelier tools over the Model Context Protocol.

mod server;

pub use server::AtelierService;
