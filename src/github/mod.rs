//! GitHub REST plumbing: transport, pagination, records and write helpers.

pub mod error;
pub mod hooks;
pub mod http;
pub mod link;
pub mod paged;
pub mod repos;
pub mod transport;
pub mod types;
