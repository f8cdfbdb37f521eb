//! Resource servers (`/api/v2/resource-servers`).

// self
use crate::{
	_prelude::*,
	client::{ApiCall, ManagementClient},
	resources::{Extra, ListParams},
};

const RESOURCE_SERVERS: &str = "resource-servers";

/// Scope declared by a resource server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceServerScope {
	/// Scope value (for example `read:reports`).
	pub value: String,
	/// Human-readable description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// Registered API definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceServer {
	/// Resource server identifier.
	#[serde(default)]
	pub id: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Audience identifier, unique per tenant.
	#[serde(default)]
	pub identifier: String,
	/// Declared scopes.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub scopes: Vec<ResourceServerScope>,
	/// Remaining server fields.
	#[serde(flatten)]
	pub extra: Extra,
}

impl ManagementClient {
	/// Lists resource servers.
	pub async fn list_resource_servers(&self, params: ListParams) -> Result<Vec<ResourceServer>> {
		self.fetch(ApiCall::get([RESOURCE_SERVERS]).paginate(&params)).await
	}

	/// Fetches one resource server by id (or URL-encoded identifier).
	pub async fn get_resource_server(&self, id: &str) -> Result<ResourceServer> {
		self.fetch(ApiCall::get([RESOURCE_SERVERS, id])).await
	}

	/// Creates a resource server from `body`.
	pub async fn create_resource_server<B>(&self, body: &B) -> Result<ResourceServer>
	where
		B: ?Sized + Serialize,
	{
		self.fetch(ApiCall::post([RESOURCE_SERVERS]).json(body)?).await
	}

	/// Applies a partial update to a resource server.
	pub async fn update_resource_server<B>(&self, id: &str, body: &B) -> Result<ResourceServer>
	where
		B: ?Sized + Serialize,
	{
		self.fetch(ApiCall::patch([RESOURCE_SERVERS, id]).json(body)?).await
	}

	/// Deletes a resource server.
	pub async fn delete_resource_server(&self, id: &str) -> Result<()> {
		self.send(ApiCall::delete([RESOURCE_SERVERS, id])).await
	}

	/// Returns the first resource server whose audience equals `identifier` exactly.
	pub async fn find_resource_server_by_identifier(
		&self,
		identifier: &str,
	) -> Result<Option<ResourceServer>> {
		let servers = self.list_resource_servers(ListParams::default()).await?;

		Ok(servers.into_iter().find(|server| server.identifier == identifier))
	}
}

#[cfg(test)]
mod tests {
	// self
	use crate::_preludet::{ScriptedReply, ScriptedTransport, scripted_client};

	#[tokio::test]
	async fn get_encodes_url_identifiers() {
		let transport = ScriptedTransport::new("tok");

		transport.push(ScriptedReply::json(
			200,
			"{\"id\":\"rs_1\",\"name\":\"Reports\",\"identifier\":\"https://reports.test/\"}",
		));

		let client = scripted_client(&transport);
		let server =
			client.get_resource_server("https://reports.test/").await.expect("Get should succeed.");

		assert_eq!(server.id, "rs_1");
		assert_eq!(
			transport.api_requests()[0].path_and_query,
			"/api/v2/resource-servers/https:%2F%2Freports.test%2F"
		);
	}

	#[tokio::test]
	async fn find_matches_identifier_not_name() {
		let transport = ScriptedTransport::new("tok");

		transport.push(ScriptedReply::json(
			200,
			"[{\"id\":\"rs_1\",\"name\":\"https://reports.test/\",\"identifier\":\"urn:other\"},{\"id\":\"rs_2\",\"name\":\"Reports\",\"identifier\":\"https://reports.test/\",\"scopes\":[{\"value\":\"read:reports\"}]}]",
		));

		let client = scripted_client(&transport);
		let found = client
			.find_resource_server_by_identifier("https://reports.test/")
			.await
			.expect("Find should succeed.")
			.expect("Server should be found.");

		assert_eq!(found.id, "rs_2");
		assert_eq!(found.scopes[0].value, "read:reports");
	}
}
