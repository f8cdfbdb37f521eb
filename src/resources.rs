//! Typed CRUD surface over the management API.
//!
//! Each submodule adds straight request/response mappings to
//! [`ManagementClient`](crate::client::ManagementClient); every method funnels through the
//! generic pipeline, so admission, authentication, and 429 retries apply uniformly.
//! Response models keep fields they do not name in a flattened `extra` map.

pub mod actions;
pub mod clients;
pub mod connections;
pub mod resource_servers;
pub mod roles;

pub use actions::*;
pub use clients::*;
pub use connections::*;
pub use resource_servers::*;
pub use roles::*;

/// Server fields not modeled explicitly.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Pagination parameters shared by list operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListParams {
	/// Zero-based page index.
	pub page: Option<u32>,
	/// Page size.
	pub per_page: Option<u32>,
}
impl ListParams {
	/// Sets the zero-based page index.
	pub fn page(mut self, page: u32) -> Self {
		self.page = Some(page);

		self
	}

	/// Sets the page size.
	pub fn per_page(mut self, per_page: u32) -> Self {
		self.per_page = Some(per_page);

		self
	}
}
