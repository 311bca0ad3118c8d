//! # rustp2p-reach
//!
//! Two pieces of the reachability story of a peer-to-peer node:
//!
//! - [`transport::webtransport`] accepts inbound webtransport sessions,
//!   admits them through the connection gater and resource manager, runs the
//!   secure handshake and queues the authenticated connections for
//!   [`Listener::accept`].
//! - [`autonat`] asks remote peers to dial our addresses back
//!   ([`Client::check_reachability`]) and serves the dial-back streams that
//!   confirm them.
//!
//! Network plumbing (HTTP/3 sessions, the secure channel, protocol streams)
//! is reached through the traits of [`rust_p2p_reach_core`].
//!
//! ## Listening
//!
//! ```rust,ignore
//! let transport = WebTransport::builder(noise)
//!     .gater(gater)
//!     .resource_manager(rcmgr)
//!     .cert_manager(cert_manager)
//!     .build();
//! let listener = transport.listen(session_listener, ListenerConfig::default());
//! while let Ok(conn) = listener.accept().await {
//!     log::info!("connection from {}", conn.remote_peer());
//! }
//! ```
//!
//! ## Checking reachability
//!
//! ```rust,ignore
//! let client = Client::new(host);
//! client.register();
//! let result = client.check_reachability(&server, &high, &low).await?;
//! println!("{} is {}", result.addr, result.reachability);
//! ```

pub mod autonat;
pub mod config;
pub mod error;
pub mod protocol;
pub mod transport;

pub use autonat::{Client, Reachability, ReachabilityResult};
pub use config::{ClientConfig, ListenerConfig};
pub use error::{Error, Result};
pub use rust_p2p_reach_core;
pub use transport::webtransport::{Listener, WebTransport, WebTransportConn};
