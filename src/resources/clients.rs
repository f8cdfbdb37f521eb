//! Applications (`/api/v2/clients`).

// self
use crate::{
	_prelude::*,
	client::{ApiCall, ManagementClient},
	resources::{Extra, ListParams},
};

const CLIENTS: &str = "clients";

/// Registered application.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
	/// Application identifier.
	#[serde(default)]
	pub client_id: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Free-form description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Application type (`spa`, `native`, `regular_web`, `non_interactive`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub app_type: Option<String>,
	/// Allowed callback URLs.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub callbacks: Vec<String>,
	/// Enabled grant types.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub grant_types: Vec<String>,
	/// Remaining server fields.
	#[serde(flatten)]
	pub extra: Extra,
}

impl ManagementClient {
	/// Lists applications.
	pub async fn list_clients(&self, params: ListParams) -> Result<Vec<Client>> {
		self.fetch(ApiCall::get([CLIENTS]).paginate(&params)).await
	}

	/// Fetches one application.
	pub async fn get_client(&self, id: &str) -> Result<Client> {
		self.fetch(ApiCall::get([CLIENTS, id])).await
	}

	/// Creates an application from `body`.
	pub async fn create_client<B>(&self, body: &B) -> Result<Client>
	where
		B: ?Sized + Serialize,
	{
		self.fetch(ApiCall::post([CLIENTS]).json(body)?).await
	}

	/// Applies a partial update to an application.
	pub async fn update_client<B>(&self, id: &str, body: &B) -> Result<Client>
	where
		B: ?Sized + Serialize,
	{
		self.fetch(ApiCall::patch([CLIENTS, id]).json(body)?).await
	}

	/// Deletes an application.
	pub async fn delete_client(&self, id: &str) -> Result<()> {
		self.send(ApiCall::delete([CLIENTS, id])).await
	}

	/// Returns the first application whose name equals `name` exactly.
	pub async fn find_client_by_name(&self, name: &str) -> Result<Option<Client>> {
		let clients = self.list_clients(ListParams::default()).await?;

		Ok(clients.into_iter().find(|client| client.name == name))
	}
}
