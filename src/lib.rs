//! # updatecheck
//!
//! A library for checking whether a newer GitHub release of the running
//! binary has been published.
//!
//! ## Example
//!
//! ```no_run
//! use updatecheck::{binary_version, UpdateChecker, UpdateCheckerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = UpdateCheckerConfig::new("owner", "repo", binary_version!());
//!     let checker = UpdateChecker::new(config)?;
//!
//!     checker.on_status_changed(|outcome| {
//!         if outcome.update_available {
//!             println!("Update available at {}", outcome.release_page_address);
//!         }
//!     });
//!
//!     let outcome = checker.check_for_update().await;
//!     assert_eq!(checker.is_update_available(), Some(outcome.update_available));
//!
//!     Ok(())
//! }
//! ```

mod checker;
mod error;
mod source;
mod types;
mod version;

pub use checker::UpdateChecker;
pub use error::{ParseVersionError, Result, UpdateCheckError};
pub use source::{GitHubReleaseSource, ReleaseSource};
pub use types::{CheckOutcome, UpdateCheckerConfig};
pub use version::{BinaryVersion, ReleaseVersion};
