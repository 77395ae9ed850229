pub mod extract;
pub mod http;
pub mod studentbostader;
pub mod traits;
pub mod types;

pub use http::HttpTransport;
pub use studentbostader::{ListingIndex, StudentbostaderScraper};
pub use traits::Transport;
pub use types::IndexEntry;
