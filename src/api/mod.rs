//! HTTP and WebSocket surface of the dashboard consumer

pub mod http;
pub mod websocket;
