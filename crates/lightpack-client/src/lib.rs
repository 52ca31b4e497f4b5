//! Lightpack Client Library
//!
//! Async client for the Lightpack / Prismatik ambient-lighting control
//! protocol.
//!
//! # Example
//!
//! ```ignore
//! use lightpack_client::{Rgb, Session};
//!
//! #[tokio::main]
//! async fn main() -> lightpack_client::Result<()> {
//!     let mut pack = Session::builder()
//!         .host("127.0.0.1")
//!         .port(3636)
//!         .api_key("secret")
//!         .connect()
//!         .await?;
//!
//!     println!("{} LEDs at {} fps", pack.led_count().await?, pack.fps().await?);
//!
//!     // Setters take the lock for the duration of the call
//!     pack.set_all_colors(Rgb::new(255, 80, 0)).await?;
//!
//!     pack.disconnect().await;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod builder;
pub mod channel;
mod device;
pub mod error;
pub mod lock;
pub mod session;

pub use builder::SessionBuilder;
pub use channel::CommandChannel;
pub use error::{ClientError, Result};
pub use lock::LockManager;
pub use session::{Session, SessionConfig, SessionState};

pub use lightpack_core::{
    ApiStatus, Attribute, Command, Error as ProtocolError, LedArea, Mode, Response, Rgb,
    ScreenRect, Status,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::builder::SessionBuilder;
    pub use crate::error::{ClientError, Result};
    pub use crate::session::{Session, SessionConfig, SessionState};
    pub use lightpack_core::{Attribute, LedArea, Mode, Rgb, Status};
}
