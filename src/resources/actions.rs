//! Actions (`/api/v2/actions/actions`) and trigger bindings
//! (`/api/v2/actions/triggers/{id}/bindings`).
//!
//! Unlike the other collections, action listings are wrapped in a paging envelope.

// self
use crate::{
	_prelude::*,
	client::{ApiCall, ManagementClient},
	resources::{Extra, ListParams},
};

const ACTIONS: [&str; 2] = ["actions", "actions"];
const TRIGGERS: [&str; 2] = ["actions", "triggers"];

/// Filters accepted by [`ManagementClient::list_actions`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionQuery {
	/// Only actions supporting this trigger (for example `post-login`).
	pub trigger_id: Option<String>,
	/// Only deployed (or undeployed) actions.
	pub deployed: Option<bool>,
	/// Zero-based page index.
	pub page: Option<u32>,
	/// Page size.
	pub per_page: Option<u32>,
}
impl ActionQuery {
	/// Restricts results to one trigger.
	pub fn trigger_id(mut self, trigger_id: impl Into<String>) -> Self {
		self.trigger_id = Some(trigger_id.into());

		self
	}

	/// Restricts results by deployment state.
	pub fn deployed(mut self, deployed: bool) -> Self {
		self.deployed = Some(deployed);

		self
	}

	/// Copies pagination from `params`.
	pub fn paginate(mut self, params: ListParams) -> Self {
		self.page = params.page;
		self.per_page = params.per_page;

		self
	}
}

/// Trigger reference carried by an action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRef {
	/// Trigger identifier.
	pub id: String,
	/// Trigger version.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
}

/// Custom code executed at a trigger point.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
	/// Action identifier.
	#[serde(default)]
	pub id: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Triggers the action can bind to.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub supported_triggers: Vec<TriggerRef>,
	/// Source code.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
	/// Runtime label (for example `node18`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub runtime: Option<String>,
	/// Build status.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	/// `true` once the latest draft is deployed.
	#[serde(default)]
	pub all_changes_deployed: bool,
	/// Remaining server fields.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Paged action listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionList {
	/// Actions on this page.
	#[serde(default)]
	pub actions: Vec<Action>,
	/// Total matching actions, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total: Option<u64>,
	/// Page index, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub page: Option<u32>,
	/// Page size, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub per_page: Option<u32>,
}

/// Immutable version produced by deploying an action.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionVersion {
	/// Version identifier.
	#[serde(default)]
	pub id: String,
	/// Sequential version number.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub number: Option<u64>,
	/// `true` when this version is live.
	#[serde(default)]
	pub deployed: bool,
	/// Remaining server fields.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Action bound to a trigger.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerBinding {
	/// Binding identifier.
	#[serde(default)]
	pub id: String,
	/// Trigger identifier.
	#[serde(default)]
	pub trigger_id: String,
	/// Label shown in the flow editor.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
	/// Bound action.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub action: Option<Action>,
	/// Remaining server fields.
	#[serde(flatten)]
	pub extra: Extra,
}

/// Ordered bindings for one trigger.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerBindings {
	/// Bindings in execution order.
	#[serde(default)]
	pub bindings: Vec<TriggerBinding>,
	/// Total bindings, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total: Option<u64>,
}

/// How a [`BindingUpdate`] identifies its action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BindingRef {
	/// Reference by action identifier.
	ActionId(String),
	/// Reference by action name.
	ActionName(String),
	/// Reference by binding identifier.
	BindingId(String),
}

/// Desired binding submitted to [`ManagementClient::update_trigger_bindings`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingUpdate {
	/// Action reference.
	#[serde(rename = "ref")]
	pub reference: BindingRef,
	/// Label shown in the flow editor.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
}
impl BindingUpdate {
	/// Binds the action with identifier `id`.
	pub fn action_id(id: impl Into<String>) -> Self {
		Self { reference: BindingRef::ActionId(id.into()), display_name: None }
	}

	/// Binds the action named `name`.
	pub fn action_name(name: impl Into<String>) -> Self {
		Self { reference: BindingRef::ActionName(name.into()), display_name: None }
	}

	/// Sets the display label.
	pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
		self.display_name = Some(display_name.into());

		self
	}
}

#[derive(Serialize)]
struct BindingsBody<'a> {
	bindings: &'a [BindingUpdate],
}

fn action_path(id: &str) -> [&str; 3] {
	[ACTIONS[0], ACTIONS[1], id]
}

fn bindings_path(trigger_id: &str) -> [&str; 4] {
	[TRIGGERS[0], TRIGGERS[1], trigger_id, "bindings"]
}

impl ManagementClient {
	/// Lists actions, optionally filtered by trigger and deployment state.
	pub async fn list_actions(&self, query: ActionQuery) -> Result<ActionList> {
		let call = ApiCall::get(ACTIONS)
			.query_opt("triggerId", query.trigger_id.as_deref())
			.query_opt("deployed", query.deployed)
			.paginate(&ListParams { page: query.page, per_page: query.per_page });

		self.fetch(call).await
	}

	/// Fetches one action.
	pub async fn get_action(&self, id: &str) -> Result<Action> {
		self.fetch(ApiCall::get(action_path(id))).await
	}

	/// Creates an action from `body`.
	pub async fn create_action<B>(&self, body: &B) -> Result<Action>
	where
		B: ?Sized + Serialize,
	{
		self.fetch(ApiCall::post(ACTIONS).json(body)?).await
	}

	/// Applies a partial update to an action's draft.
	pub async fn update_action<B>(&self, id: &str, body: &B) -> Result<Action>
	where
		B: ?Sized + Serialize,
	{
		self.fetch(ApiCall::patch(action_path(id)).json(body)?).await
	}

	/// Deletes an action.
	pub async fn delete_action(&self, id: &str) -> Result<()> {
		self.send(ApiCall::delete(action_path(id))).await
	}

	/// Deploys the current draft of an action.
	pub async fn deploy_action(&self, id: &str) -> Result<ActionVersion> {
		self.fetch(ApiCall::post([ACTIONS[0], ACTIONS[1], id, "deploy"])).await
	}

	/// Returns the first action whose name equals `name` exactly.
	pub async fn find_action_by_name(&self, name: &str) -> Result<Option<Action>> {
		let listing = self.list_actions(ActionQuery::default()).await?;

		Ok(listing.actions.into_iter().find(|action| action.name == name))
	}

	/// Lists the bindings attached to a trigger.
	pub async fn get_trigger_bindings(&self, trigger_id: &str) -> Result<TriggerBindings> {
		self.fetch(ApiCall::get(bindings_path(trigger_id))).await
	}

	/// Replaces the ordered bindings of a trigger.
	pub async fn update_trigger_bindings(
		&self,
		trigger_id: &str,
		bindings: &[BindingUpdate],
	) -> Result<TriggerBindings> {
		let call = ApiCall::patch(bindings_path(trigger_id)).json(&BindingsBody { bindings })?;

		self.fetch(call).await
	}
}
