//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 subset: one GET request per connection,
//! answered with a status line, `Date`, an optional `Content-Type` and the
//! raw body, then the connection is closed.
//!
//! # Architecture
//!
//! - **`message`**: The request/response `Message` and its wire form
//! - **`request`**: Parsed request fields and the `Method` set
//! - **`response`**: Status codes, response fields and the builder
//! - **`parser`**: Parses a header block out of a byte buffer
//! - **`writer`**: Writes a serialized response to the client
//! - **`connection`**: The per-connection state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │ AwaitingRequest  │ ← Read until the blank line
//!        └──────┬───────────┘
//!               │ Header block parsed
//!               ▼
//!        ┌──────────────────┐
//!        │     Parsed       │ ← Dispatch on method, serve the file
//!        └──────┬───────────┘
//!               │ Response built
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatched     │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!        ┌──────────────────┐
//!        │    Responded     │ → Closed
//!        └──────────────────┘
//! ```
//!
//! A malformed header block skips `Parsed` and goes straight to
//! `Dispatched` with a 400. Read and write failures go straight to
//! `Closed`.
//!
//! # Example
//!
//! ```ignore
//! use vhostd::config::ServerSettings;
//! use vhostd::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let settings = ServerSettings::default();
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let settings = settings.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, settings);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod message;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
