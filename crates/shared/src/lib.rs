pub mod domain;
pub mod error;
pub mod filter;
pub mod protocol;

pub use filter::{FilterField, FilterQuery, FilterState, PageNumber};
pub use protocol::{display_label, ListingPage, ListingResponse, PageMeta, PaginationLink};
