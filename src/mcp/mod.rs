// JSON-RPC tool surface shared by stdio MCP mode and the `/rpc` route
pub mod handler;
pub mod protocol;
pub mod stdio;
