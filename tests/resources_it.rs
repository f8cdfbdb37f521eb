// crates.io
use httpmock::prelude::*;
// self
use identity_mgmt::{
	_preludet::*,
	client::ManagementClient,
	resources::{ActionQuery, BindingUpdate, ConnectionQuery, ListParams, Permission},
};

async fn start() -> (MockServer, ManagementClient) {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"tok\",\"token_type\":\"Bearer\",\"expires_in\":86400}");
		})
		.await;

	let client = reqwest_test_client(&server.address().to_string());

	(server, client)
}

#[tokio::test]
async fn client_lifecycle_maps_to_rest_verbs() {
	let (server, client) = start().await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v2/clients")
				.header("authorization", "Bearer tok")
				.json_body(serde_json::json!({ "name": "Portal", "app_type": "spa" }));
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"client_id\":\"c1\",\"name\":\"Portal\",\"app_type\":\"spa\"}");
		})
		.await;
	let update = server
		.mock_async(|when, then| {
			when.method(PATCH)
				.path("/api/v2/clients/c1")
				.json_body(serde_json::json!({ "description": "Customer portal" }));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"client_id\":\"c1\",\"name\":\"Portal\",\"description\":\"Customer portal\"}");
		})
		.await;
	let delete = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/v2/clients/c1");
			then.status(204);
		})
		.await;
	let created = client
		.create_client(&serde_json::json!({ "name": "Portal", "app_type": "spa" }))
		.await
		.expect("Create should succeed.");
	let updated = client
		.update_client(&created.client_id, &serde_json::json!({ "description": "Customer portal" }))
		.await
		.expect("Update should succeed.");

	client.delete_client(&created.client_id).await.expect("Delete should succeed.");

	assert_eq!(created.app_type.as_deref(), Some("spa"));
	assert_eq!(updated.description.as_deref(), Some("Customer portal"));

	create.assert_calls_async(1).await;
	update.assert_calls_async(1).await;
	delete.assert_calls_async(1).await;
}

#[tokio::test]
async fn filters_reach_the_query_string() {
	let (server, client) = start().await;
	let connections = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v2/connections")
				.query_param("strategy", "google-oauth2")
				.query_param("page", "1")
				.query_param("per_page", "25");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":\"con_g\",\"name\":\"google\",\"strategy\":\"google-oauth2\"}]");
		})
		.await;
	let actions = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v2/actions/actions")
				.query_param("triggerId", "post-login")
				.query_param("deployed", "false");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"actions\":[],\"total\":0}");
		})
		.await;
	let listed = client
		.list_connections(
			ConnectionQuery::default()
				.strategy("google-oauth2")
				.paginate(ListParams::default().page(1).per_page(25)),
		)
		.await
		.expect("Connection listing should succeed.");
	let drafts = client
		.list_actions(ActionQuery::default().trigger_id("post-login").deployed(false))
		.await
		.expect("Action listing should succeed.");

	assert_eq!(listed[0].id, "con_g");
	assert!(drafts.actions.is_empty());

	connections.assert_calls_async(1).await;
	actions.assert_calls_async(1).await;
}

#[tokio::test]
async fn find_by_name_never_fails_on_missing_match() {
	let (server, client) = start().await;
	let roles = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v2/roles");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":\"rol_1\",\"name\":\"viewer\"},{\"id\":\"rol_2\",\"name\":\"editor\"}]");
		})
		.await;
	let found = client.find_role_by_name("editor").await.expect("Lookup should succeed.");
	let missing = client.find_role_by_name("owner").await.expect("Lookup should succeed.");

	assert_eq!(found.map(|role| role.id), Some("rol_2".to_owned()));
	assert!(missing.is_none());

	roles.assert_calls_async(2).await;
}

#[tokio::test]
async fn action_deploy_and_bindings_round_trip() {
	let (server, client) = start().await;
	let deploy = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v2/actions/actions/act_1/deploy");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"ver_9\",\"number\":9,\"deployed\":true,\"runtime\":\"node18\"}");
		})
		.await;
	let bindings = server
		.mock_async(|when, then| {
			when.method(PATCH)
				.path("/api/v2/actions/triggers/post-login/bindings")
				.json_body(serde_json::json!({
					"bindings": [{ "ref": { "type": "action_id", "value": "act_1" } }]
				}));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"bindings\":[{\"id\":\"bind_1\",\"trigger_id\":\"post-login\",\"action\":{\"id\":\"act_1\",\"name\":\"enrich\"}}]}");
		})
		.await;
	let version = client.deploy_action("act_1").await.expect("Deploy should succeed.");
	let updated = client
		.update_trigger_bindings("post-login", &[BindingUpdate::action_id("act_1")])
		.await
		.expect("Binding update should succeed.");

	assert_eq!(version.extra.get("runtime"), Some(&serde_json::json!("node18")));
	assert_eq!(
		updated.bindings[0].action.as_ref().map(|action| action.name.as_str()),
		Some("enrich")
	);

	deploy.assert_calls_async(1).await;
	bindings.assert_calls_async(1).await;
}

#[tokio::test]
async fn role_permissions_use_body_on_delete() {
	let (server, client) = start().await;
	let body = serde_json::json!({
		"permissions": [{
			"resource_server_identifier": "https://api.test/",
			"permission_name": "read:things",
		}]
	});
	let add = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v2/roles/rol_1/permissions").json_body(body.clone());
			then.status(201);
		})
		.await;
	let remove = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/v2/roles/rol_1/permissions").json_body(body.clone());
			then.status(204);
		})
		.await;
	let grants = [Permission::new("https://api.test/", "read:things")];

	client.add_role_permissions("rol_1", &grants).await.expect("Grant should succeed.");
	client.remove_role_permissions("rol_1", &grants).await.expect("Revoke should succeed.");

	add.assert_calls_async(1).await;
	remove.assert_calls_async(1).await;
}

#[tokio::test]
async fn resource_server_lookup_by_identifier() {
	let (server, client) = start().await;
	let servers = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v2/resource-servers").header("authorization", "Bearer tok");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":\"rs_mgmt\",\"name\":\"Management\",\"identifier\":\"https://tenant/api/v2/\"},{\"id\":\"rs_app\",\"name\":\"App\",\"identifier\":\"https://api.test/\"}]");
		})
		.await;
	let found = client
		.find_resource_server_by_identifier("https://api.test/")
		.await
		.expect("Lookup should succeed.")
		.expect("Resource server should exist.");

	assert_eq!(found.id, "rs_app");

	servers.assert_calls_async(1).await;
}
