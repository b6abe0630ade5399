// RFC 3263 server location for SIP

//! # sip-locator
//!
//! Resolves a SIP or SIPS URI into an ordered list of [`Hop`]s (address, port,
//! transport) following RFC 3263 "Locating SIP Servers".
//!
//! ```text
//! rsip::Uri ──> Locator ──> NAPTR ──> SRV ──> A / AAAA ──> Vec<Hop>
//!                  │                                  ▲
//!                  └──── numeric host / explicit port ┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sip_locator::{resolver::HickoryResolver, LocatorBuilder};
//!
//! # async fn example() -> sip_locator::Result<()> {
//! let locator = LocatorBuilder::new()
//!     .with_resolver(HickoryResolver::from_system()?)
//!     .build()?;
//!
//! let uri = rsip::Uri::try_from("sip:bob@example.com")
//!     .map_err(|e| sip_locator::Error::MalformedInput(e.to_string()))?;
//! for hop in locator.locate(&uri).await? {
//!     println!("try {}", hop);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! "No records of this type" is never an error: it moves resolution to the
//! next fallback stage. Only hard lookup failures that leave no candidate at
//! all surface as [`Error::ResolutionFailure`].
//!
//! ```rust
//! use sip_locator::Error;
//!
//! fn describe(error: Error) -> String {
//!     match error {
//!         Error::MalformedInput(msg) => format!("bad input: {msg}"),
//!         Error::ResolutionFailure(target, cause) => format!("{target}: {cause}"),
//!         other => other.to_string(),
//!     }
//! }
//! ```

pub type Result<T> = std::result::Result<T, crate::error::Error>;
pub use crate::error::Error;
pub mod error;
pub mod hop;
pub mod locator;
pub mod resolver;
pub mod rsip_ext;
pub mod selector;

pub use hop::{Hop, HopParser};
pub use locator::{Locator, LocatorBuilder, LocatorConfig};
pub use selector::SelectionMode;

pub const VERSION: &str = concat!("sip-locator/", env!("CARGO_PKG_VERSION"));
