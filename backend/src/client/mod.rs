//! Client side of the API: an HTTP client and the list/detail controllers
//! that sit behind each management screen.

pub mod api;
pub mod controller;

pub use api::{ApiClient, ClientError, Remote};
pub use controller::{ListController, ResourceController, Searchable};
