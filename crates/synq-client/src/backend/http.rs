//! JSON-over-HTTP backend.
//!
//! Every call is a `POST {api_base}/{service}/{Method}` with a JSON body and a
//! bearer token obtained through the client-credentials exchange.

use crate::auth::{Credentials, Endpoint, fetch_token};
use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{CoordinateMatch, EntityInfo, MonitorQuery, PathCoordinates};
use reconcile::{MonitorDescriptor, TestDescriptor};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const IAM_SERVICE: &str = "synq.auth.iam.v1.IamService";
const MONITORS_SERVICE: &str = "synq.monitors.custom_monitors.v1.CustomMonitorsService";
const SQL_TESTS_SERVICE: &str = "synq.datachecks.sqltests.v1.SqlTestsService";
const ENTITIES_SERVICE: &str = "synq.entities.entities.v1.EntitiesService";
const COORDINATES_SERVICE: &str = "synq.entities.coordinates.v1.DatabaseCoordinatesService";

/// Backend talking to the live service.
///
/// # Example
///
/// ```no_run
/// use synq_client::auth::Credentials;
/// use synq_client::backend::Backend;
/// use synq_client::backend::http::HttpBackend;
///
/// let credentials = Credentials {
///     client_id: "id".to_string(),
///     client_secret: "secret".to_string(),
///     api_url: "https://developer.synq.io".to_string(),
/// };
/// let backend = HttpBackend::connect(&credentials).unwrap();
/// println!("workspace: {}", backend.workspace().unwrap());
/// ```
pub struct HttpBackend {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Scheme and host, without a trailing slash.
    api_base: String,
    token: String,
}

impl HttpBackend {
    /// Exchange `credentials` for a token and build a backend.
    pub fn connect(credentials: &Credentials) -> Result<Self> {
        let endpoint = Endpoint::parse(&credentials.api_url)?;
        let agent = ureq::Agent::new_with_defaults();
        let token = fetch_token(&agent, &endpoint.token_url(), credentials)?;
        log::info!("authenticated against {}", endpoint.host);
        Ok(Self {
            agent,
            api_base: endpoint.base_url(),
            token,
        })
    }

    /// Create a backend with a custom API base and an existing token (for testing).
    #[must_use]
    pub fn with_token(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Get the current API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn method_url(&self, service: &str, method: &str) -> String {
        format!("{}/{}/{}", self.api_base, service, method)
    }

    fn call<Req, Resp>(&self, service: &str, method: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = self.method_url(service, method);
        log::debug!("POST {url}");

        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send_json(request)
            .map_err(|e| match Error::from(e) {
                Error::Http { message, status } => Error::Http {
                    message: format!("{method}: {message}"),
                    status,
                },
                other => other,
            })?;

        response.body_mut().read_json().map_err(|e| Error::Rpc {
            method: method.to_string(),
            message: format!("could not decode response: {e}"),
        })
    }
}

#[derive(Serialize)]
struct Empty {}

#[derive(Deserialize)]
struct IamResponse {
    workspace: String,
}

#[derive(Deserialize)]
struct ListMonitorsResponse {
    #[serde(default)]
    monitors: Vec<MonitorDescriptor>,
}

#[derive(Serialize)]
struct MonitorsRequest<'a> {
    monitors: &'a [MonitorDescriptor],
}

#[derive(Serialize)]
struct UpdateMonitorsRequest<'a> {
    monitors: &'a [MonitorDescriptor],
    monitor_ids_to_reset: &'a [String],
}

#[derive(Serialize)]
struct IdsRequest<'a> {
    ids: &'a [String],
}

#[derive(Serialize)]
struct ListSqlTestsRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    ids: &'a [String],
}

#[derive(Deserialize)]
struct ListSqlTestsResponse {
    #[serde(default)]
    sql_tests: Vec<TestDescriptor>,
}

#[derive(Serialize)]
struct SqlTestsRequest<'a> {
    sql_tests: &'a [TestDescriptor],
}

#[derive(Serialize)]
struct PathsRequest<'a> {
    paths: &'a [String],
}

#[derive(Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: Vec<EntityInfo>,
}

#[derive(Serialize)]
struct CoordinatesRequest<'a> {
    coordinates: &'a [String],
}

#[derive(Deserialize)]
struct IdsByCoordinatesResponse {
    #[serde(default)]
    matches: Vec<CoordinateMatch>,
}

#[derive(Deserialize)]
struct DatabaseCoordinatesResponse {
    #[serde(default)]
    coordinates: Vec<PathCoordinates>,
}

#[derive(Deserialize)]
struct Ack {}

fn keyed_tests(tests: Vec<TestDescriptor>) -> HashMap<String, TestDescriptor> {
    tests.into_iter().map(|t| (t.id.clone(), t)).collect()
}

impl Backend for HttpBackend {
    fn workspace(&self) -> Result<String> {
        let response: IamResponse = self.call(IAM_SERVICE, "Iam", &Empty {})?;
        Ok(response.workspace)
    }

    fn list_monitors(&self, query: &MonitorQuery) -> Result<Vec<MonitorDescriptor>> {
        let response: ListMonitorsResponse = self.call(MONITORS_SERVICE, "ListMonitors", query)?;
        log::debug!("ListMonitors returned {} monitors", response.monitors.len());
        Ok(response.monitors)
    }

    fn create_monitors(&self, monitors: &[MonitorDescriptor]) -> Result<()> {
        log::info!("creating {} monitors", monitors.len());
        let request = MonitorsRequest { monitors };
        let _: Ack = self.call(MONITORS_SERVICE, "BatchCreateMonitor", &request)?;
        Ok(())
    }

    fn delete_monitors(&self, ids: &[String]) -> Result<()> {
        log::info!("deleting {} monitors", ids.len());
        let _: Ack = self.call(MONITORS_SERVICE, "BatchDeleteMonitor", &IdsRequest { ids })?;
        Ok(())
    }

    fn update_monitors(&self, monitors: &[MonitorDescriptor], reset_ids: &[String]) -> Result<()> {
        log::info!(
            "updating {} monitors ({} reset)",
            monitors.len(),
            reset_ids.len()
        );
        let request = UpdateMonitorsRequest {
            monitors,
            monitor_ids_to_reset: reset_ids,
        };
        let _: Ack = self.call(MONITORS_SERVICE, "BatchUpdateMonitor", &request)?;
        Ok(())
    }

    fn fetch_tests_by_namespace(&self, namespace: &str) -> Result<HashMap<String, TestDescriptor>> {
        let request = ListSqlTestsRequest {
            namespace: Some(namespace),
            ids: &[],
        };
        let response: ListSqlTestsResponse =
            self.call(SQL_TESTS_SERVICE, "ListSqlTests", &request)?;
        Ok(keyed_tests(response.sql_tests))
    }

    fn fetch_tests_by_ids(&self, ids: &[String]) -> Result<HashMap<String, TestDescriptor>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let request = ListSqlTestsRequest {
            namespace: None,
            ids,
        };
        let response: ListSqlTestsResponse =
            self.call(SQL_TESTS_SERVICE, "ListSqlTests", &request)?;
        Ok(keyed_tests(response.sql_tests))
    }

    fn upsert_tests(&self, tests: &[TestDescriptor]) -> Result<()> {
        log::info!("upserting {} sql tests", tests.len());
        let _: Ack = self.call(
            SQL_TESTS_SERVICE,
            "BatchUpsertSqlTests",
            &SqlTestsRequest { sql_tests: tests },
        )?;
        Ok(())
    }

    fn delete_tests(&self, ids: &[String]) -> Result<()> {
        log::info!("deleting {} sql tests", ids.len());
        let _: Ack = self.call(SQL_TESTS_SERVICE, "BatchDeleteSqlTests", &IdsRequest { ids })?;
        Ok(())
    }

    fn get_entities(&self, paths: &[String]) -> Result<Vec<EntityInfo>> {
        let response: EntitiesResponse =
            self.call(ENTITIES_SERVICE, "BatchGetEntities", &PathsRequest { paths })?;
        Ok(response.entities)
    }

    fn ids_by_coordinates(&self, coordinates: &[String]) -> Result<Vec<CoordinateMatch>> {
        let response: IdsByCoordinatesResponse = self.call(
            COORDINATES_SERVICE,
            "BatchIdsByCoordinates",
            &CoordinatesRequest { coordinates },
        )?;
        Ok(response.matches)
    }

    fn coordinates_by_paths(&self, paths: &[String]) -> Result<Vec<PathCoordinates>> {
        let response: DatabaseCoordinatesResponse = self.call(
            COORDINATES_SERVICE,
            "BatchDatabaseCoordinates",
            &PathsRequest { paths },
        )?;
        Ok(response.coordinates)
    }
}
