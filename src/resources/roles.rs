//! Roles (`/api/v2/roles`) and their permissions.

// self
use crate::{
	_prelude::*,
	client::{ApiCall, ManagementClient},
	resources::{Extra, ListParams},
};

const ROLES: &str = "roles";
const PERMISSIONS: &str = "permissions";

/// Named set of permissions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Role {
	/// Role identifier.
	#[serde(default)]
	pub id: String,
	/// Unique role name.
	#[serde(default)]
	pub name: String,
	/// Free-form description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Remaining server fields.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Scope of one resource server granted through a role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
	/// Audience of the resource server declaring the scope.
	pub resource_server_identifier: String,
	/// Scope value.
	pub permission_name: String,
	/// Resource server display name; only present in responses.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub resource_server_name: Option<String>,
	/// Scope description; only present in responses.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}
impl Permission {
	/// Creates a permission reference for `permission_name` on `resource_server_identifier`.
	pub fn new(
		resource_server_identifier: impl Into<String>,
		permission_name: impl Into<String>,
	) -> Self {
		Self {
			resource_server_identifier: resource_server_identifier.into(),
			permission_name: permission_name.into(),
			resource_server_name: None,
			description: None,
		}
	}
}

#[derive(Serialize)]
struct PermissionsBody<'a> {
	permissions: &'a [Permission],
}

impl ManagementClient {
	/// Lists roles.
	pub async fn list_roles(&self, params: ListParams) -> Result<Vec<Role>> {
		self.fetch(ApiCall::get([ROLES]).paginate(&params)).await
	}

	/// Fetches one role.
	pub async fn get_role(&self, id: &str) -> Result<Role> {
		self.fetch(ApiCall::get([ROLES, id])).await
	}

	/// Creates a role from `body`.
	pub async fn create_role<B>(&self, body: &B) -> Result<Role>
	where
		B: ?Sized + Serialize,
	{
		self.fetch(ApiCall::post([ROLES]).json(body)?).await
	}

	/// Applies a partial update to a role.
	pub async fn update_role<B>(&self, id: &str, body: &B) -> Result<Role>
	where
		B: ?Sized + Serialize,
	{
		self.fetch(ApiCall::patch([ROLES, id]).json(body)?).await
	}

	/// Deletes a role.
	pub async fn delete_role(&self, id: &str) -> Result<()> {
		self.send(ApiCall::delete([ROLES, id])).await
	}

	/// Returns the first role whose name equals `name` exactly.
	pub async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
		let roles = self.list_roles(ListParams::default()).await?;

		Ok(roles.into_iter().find(|role| role.name == name))
	}

	/// Lists the permissions granted by a role.
	pub async fn get_role_permissions(&self, id: &str) -> Result<Vec<Permission>> {
		self.fetch(ApiCall::get([ROLES, id, PERMISSIONS])).await
	}

	/// Grants `permissions` to a role.
	pub async fn add_role_permissions(&self, id: &str, permissions: &[Permission]) -> Result<()> {
		self.send(ApiCall::post([ROLES, id, PERMISSIONS]).json(&PermissionsBody { permissions })?)
			.await
	}

	/// Revokes `permissions` from a role.
	pub async fn remove_role_permissions(
		&self,
		id: &str,
		permissions: &[Permission],
	) -> Result<()> {
		self.send(ApiCall::delete([ROLES, id, PERMISSIONS]).json(&PermissionsBody { permissions })?)
			.await
	}
}
