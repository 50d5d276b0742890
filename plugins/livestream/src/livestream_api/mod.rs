//! Livestream REST API client.
//!
//! Everything that talks to `livestreamapis.com` lives here. The layers, from the bottom up:
//!
//! - [`request::SignedRequest`] describes one authenticated GET.
//! - [`transport::HttpTransport`] performs it. [`transport::ReqwestTransport`] is the real one.
//! - [`queue::RequestQueue`] makes sure only one request is in flight per client, with a fixed
//!   pause between requests to stay under the account's rate limit.
//! - [`client::LivestreamClient`] and [`client::AccountClient`] expose named operations and turn
//!   HTTP statuses into `Ok(Some(_))`, `Ok(None)` (404) or an [`error::ApiError`].
//! - [`pagination`] walks an event's video feed across pages.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use livestream_provider::config::ProviderConfig;
//! use livestream_provider::livestream_api::{Credentials, LivestreamClient};
//!
//! # async fn example() -> eyre::Result<()> {
//! let client = LivestreamClient::new(&ProviderConfig::default())?;
//! let account = client.account(Credentials::new("api-key", "1234", None))?;
//!
//! if let Some(listing) = account.get_all_event_vods("5678").await? {
//!     for video in listing.vods {
//!         println!("{} {:?}", video.id, video.caption);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod events;
pub mod pagination;
pub mod queue;
pub mod request;
pub mod transport;
pub mod types;
pub mod videos;

pub use client::{AccountClient, Credentials, LivestreamClient, MissingCredential};
pub use error::{ApiError, TransportError};
pub use events::{Account, Event};
pub use pagination::EventVideoListing;
pub use queue::{QueueClosed, RequestQueue};
pub use request::{Endpoint, SignedRequest};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{Logo, PagedStream};
pub use videos::{EventVideosResponse, FeedItem, FeedPage, Video};
