//! Pipeline engine module
//!
//! Turns a validated [`crate::script::Script`] into a running
//! extraction-and-navigation process: fetch a page, evaluate each rule's
//! selector, dispatch matches to the `collect` or `follow` handler, repeat
//! until the fetch queue drains.

mod collector;
mod fetcher;
mod page;
mod robots;

pub use collector::Engine;
pub use fetcher::{build_http_client, fetch_page, FetchError, FetchedPage};
pub use page::{Element, Page};
pub use robots::RobotsCache;
