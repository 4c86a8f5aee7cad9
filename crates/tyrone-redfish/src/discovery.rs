//! Endpoint discovery from the service root.
//!
//! Each walk starts from `/redfish/v1/` and returns the resolved URLs as a
//! value; nothing is remembered between calls. When a collection lists
//! several members the first one wins.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::client::RedfishClient;
use crate::error::{RedfishError, RedfishResult};
use crate::extract::{member_ids, odata_id};

/// Endpoints resolved by one discovery walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEndpoints {
    /// First member of `Systems`.
    pub system: Url,
    /// First member of `Chassis`, when the service exposes one.
    pub chassis: Option<Url>,
}

/// Resolve the first system only (power, LED, boot, storage).
///
/// # Errors
///
/// Fails when the root cannot be read, does not link to `Systems`, or the
/// collection is empty.
pub async fn discover_system(client: &RedfishClient) -> RedfishResult<Url> {
    let root_url = client.service_root()?;
    let root = client.get_json(&root_url).await?;
    first_member(client, &root, &root_url, "Systems").await
}

/// Resolve the system and, when available, the chassis in one walk.
///
/// Only the system is mandatory; an unresolvable chassis is logged and left
/// empty.
///
/// # Errors
///
/// Fails under the same conditions as [`discover_system`].
pub async fn discover(client: &RedfishClient) -> RedfishResult<ServiceEndpoints> {
    let root_url = client.service_root()?;
    let root = client.get_json(&root_url).await?;
    let system = first_member(client, &root, &root_url, "Systems").await?;
    let chassis = optional_member(client, &root, &root_url, "Chassis").await;

    let endpoints = ServiceEndpoints { system, chassis };
    debug!(?endpoints, "endpoints discovered");
    Ok(endpoints)
}

/// Resolve the first member of the collection linked as `link` from `parent`.
///
/// # Errors
///
/// Fails on a missing link, a failed GET, or an empty collection.
pub async fn first_member(
    client: &RedfishClient,
    parent: &Value,
    parent_url: &Url,
    link: &str,
) -> RedfishResult<Url> {
    let reference = odata_id(parent, link).ok_or_else(|| RedfishError::MissingLink {
        resource: parent_url.to_string(),
        link: link.to_string(),
    })?;
    let collection_url = client.resolve(reference)?;
    let collection = client.get_json(&collection_url).await?;
    let first = member_ids(&collection)
        .first()
        .copied()
        .ok_or_else(|| RedfishError::NoMembers {
            collection: collection_url.to_string(),
        })?;
    client.resolve(first)
}

async fn optional_member(
    client: &RedfishClient,
    root: &Value,
    root_url: &Url,
    link: &str,
) -> Option<Url> {
    match first_member(client, root, root_url, link).await {
        Ok(url) => Some(url),
        Err(err) => {
            warn!(link, error = %err, "optional endpoint unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::mock_client;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn empty_systems_collection_fails_discovery() -> RedfishResult<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/");
            then.status(200)
                .json_body(json!({"Systems": {"@odata.id": "/redfish/v1/Systems"}}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems");
            then.status(200).json_body(json!({"Members": []}));
        });

        let client = mock_client(&server)?;
        let err = discover_system(&client).await.expect_err("no systems");
        assert!(matches!(err, RedfishError::NoMembers { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn missing_systems_link_is_reported() -> RedfishResult<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/");
            then.status(200).json_body(json!({"RedfishVersion": "1.0.0"}));
        });

        let client = mock_client(&server)?;
        let err = discover_system(&client).await.expect_err("no link");
        assert!(matches!(err, RedfishError::MissingLink { ref link, .. } if link == "Systems"));
        Ok(())
    }

    #[tokio::test]
    async fn discover_takes_first_members_and_tolerates_missing_chassis() -> RedfishResult<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/");
            then.status(200).json_body(json!({
                "Systems": {"@odata.id": "/redfish/v1/Systems"},
                "Chassis": {"@odata.id": "/redfish/v1/Chassis"}
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems");
            then.status(200).json_body(json!({"Members": [
                {"@odata.id": "/redfish/v1/Systems/Self"},
                {"@odata.id": "/redfish/v1/Systems/Other"}
            ]}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Chassis");
            then.status(500);
        });

        let client = mock_client(&server)?;
        let endpoints = discover(&client).await?;
        assert!(endpoints.system.as_str().ends_with("/redfish/v1/Systems/Self"));
        assert_eq!(endpoints.chassis, None);
        Ok(())
    }
}
