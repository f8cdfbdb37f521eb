//! Connections (`/api/v2/connections`).

// self
use crate::{
	_prelude::*,
	client::{ApiCall, ManagementClient},
	resources::{Extra, ListParams},
};

const CONNECTIONS: &str = "connections";

/// Filters accepted by [`ManagementClient::list_connections`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionQuery {
	/// Identity provider strategy (for example `auth0` or `google-oauth2`).
	pub strategy: Option<String>,
	/// Zero-based page index.
	pub page: Option<u32>,
	/// Page size.
	pub per_page: Option<u32>,
}
impl ConnectionQuery {
	/// Restricts results to one strategy.
	pub fn strategy(mut self, strategy: impl Into<String>) -> Self {
		self.strategy = Some(strategy.into());

		self
	}

	/// Copies pagination from `params`.
	pub fn paginate(mut self, params: ListParams) -> Self {
		self.page = params.page;
		self.per_page = params.per_page;

		self
	}

	fn params(&self) -> ListParams {
		ListParams { page: self.page, per_page: self.per_page }
	}
}

/// Identity source attached to the tenant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
	/// Connection identifier.
	#[serde(default)]
	pub id: String,
	/// Unique connection name.
	#[serde(default)]
	pub name: String,
	/// Identity provider strategy.
	#[serde(default)]
	pub strategy: String,
	/// Applications allowed to use this connection.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub enabled_clients: Vec<String>,
	/// Remaining server fields.
	#[serde(flatten)]
	pub extra: Extra,
}

impl ManagementClient {
	/// Lists connections, optionally filtered by strategy.
	pub async fn list_connections(&self, query: ConnectionQuery) -> Result<Vec<Connection>> {
		let call = ApiCall::get([CONNECTIONS])
			.query_opt("strategy", query.strategy.as_deref())
			.paginate(&query.params());

		self.fetch(call).await
	}

	/// Fetches one connection.
	pub async fn get_connection(&self, id: &str) -> Result<Connection> {
		self.fetch(ApiCall::get([CONNECTIONS, id])).await
	}

	/// Creates a connection from `body`.
	pub async fn create_connection<B>(&self, body: &B) -> Result<Connection>
	where
		B: ?Sized + Serialize,
	{
		self.fetch(ApiCall::post([CONNECTIONS]).json(body)?).await
	}

	/// Applies a partial update to a connection.
	pub async fn update_connection<B>(&self, id: &str, body: &B) -> Result<Connection>
	where
		B: ?Sized + Serialize,
	{
		self.fetch(ApiCall::patch([CONNECTIONS, id]).json(body)?).await
	}

	/// Deletes a connection.
	pub async fn delete_connection(&self, id: &str) -> Result<()> {
		self.send(ApiCall::delete([CONNECTIONS, id])).await
	}

	/// Returns the first connection whose name equals `name` exactly.
	pub async fn find_connection_by_name(&self, name: &str) -> Result<Option<Connection>> {
		let connections = self.list_connections(ConnectionQuery::default()).await?;

		Ok(connections.into_iter().find(|connection| connection.name == name))
	}
}
