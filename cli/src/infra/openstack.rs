//! OpenStack implementation of the `ComputeProvider` port.
//!
//! Talks to Keystone v3, Nova, Neutron and Glance over their REST APIs with a
//! single project-scoped token obtained at construction.

use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use crate::application::ports::{ComputeProvider, InstanceRequest};
use crate::domain::error::{ProviderError, ResourceKind};
use crate::domain::{InstanceStatus, ProviderConfig, RemoteInstance};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const TOKEN_HEADER: &str = "X-Subject-Token";
const AUTH_HEADER: &str = "X-Auth-Token";

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Token,
}

#[derive(Debug, Deserialize)]
struct Token {
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

#[derive(Debug, Deserialize)]
struct Endpoint {
    interface: String,
    #[serde(default)]
    region_id: Option<String>,
    #[serde(default)]
    region: Option<String>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct Named {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ImageList {
    images: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct FlavorList {
    flavors: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct NetworkList {
    networks: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct Link {
    rel: String,
    href: String,
}

#[derive(Debug, Deserialize)]
struct ServerList {
    servers: Vec<RemoteInstance>,
    #[serde(default)]
    servers_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct ServerEnvelope {
    server: RemoteInstance,
}

#[derive(Debug, Deserialize)]
struct CreatedServer {
    server: CreatedServerId,
}

#[derive(Debug, Deserialize)]
struct CreatedServerId {
    id: String,
}

/// Service endpoints taken from the token's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub compute: String,
    pub network: String,
    pub image: String,
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Authenticated OpenStack session.
pub struct OpenStackClient {
    http: Client,
    token: String,
    endpoints: Endpoints,
}

impl OpenStackClient {
    /// Authenticate against Keystone and pick public endpoints in the
    /// configured region.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Authentication`] when Keystone rejects the
    /// credentials or its response is unusable, and
    /// [`ProviderError::EndpointNotFound`] when a required service is missing
    /// from the catalog.
    pub async fn authenticate(config: &ProviderConfig) -> Result<Self> {
        let http = build_http_client()?;
        let url = format!("{}/auth/tokens", identity_base(&config.auth_url));
        tracing::debug!(%url, user = %config.username, "authenticating");

        let resp = http
            .post(&url)
            .json(&auth_request_body(config))
            .send()
            .await
            .map_err(|e| ProviderError::Authentication(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let reason = if status == StatusCode::UNAUTHORIZED {
                "invalid credentials".to_string()
            } else {
                format!("HTTP {}: {body}", status.as_u16())
            };
            return Err(ProviderError::Authentication(reason).into());
        }

        let token = resp
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::Authentication(format!("response carried no {TOKEN_HEADER}"))
            })?;
        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Authentication(format!("invalid token response: {e}")))?;

        let endpoints = endpoints_from_catalog(&body.token.catalog, &config.region_name)?;
        tracing::debug!(?endpoints, "resolved service endpoints");
        Ok(Self {
            http,
            token,
            endpoints,
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        tracing::debug!(%method, %url, "openstack request");
        self.http
            .request(method, url)
            .header(AUTH_HEADER, &self.token)
    }

    fn compute_url(&self, path: &str) -> String {
        join(&self.endpoints.compute, path)
    }

    /// `{compute}/{collection}/{item}` with `item` percent-encoded.
    fn compute_item_url(&self, collection: &str, item: &str) -> Result<String> {
        item_url(&self.endpoints.compute, collection, item)
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        operation: &'static str,
    ) -> Result<Response, ProviderError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                operation,
                reason: e.to_string(),
            })?;
        check_status(resp, operation).await
    }

    async fn json<T: for<'de> Deserialize<'de>>(
        resp: Response,
        operation: &'static str,
    ) -> Result<T, ProviderError> {
        resp.json().await.map_err(|e| ProviderError::UnexpectedResponse {
            operation,
            reason: e.to_string(),
        })
    }
}

impl ComputeProvider for OpenStackClient {
    async fn resolve_image(&self, name: &str) -> Result<String> {
        const OP: &str = "list images";
        let url = join(&self.endpoints.image, "v2/images");
        let resp = self
            .send(self.request(Method::GET, &url).query(&[("name", name)]), OP)
            .await?;
        let list: ImageList = Self::json(resp, OP).await?;
        first_id(list.images, ResourceKind::Image, name)
    }

    async fn resolve_flavor(&self, name: &str) -> Result<String> {
        const OP: &str = "list flavors";
        let url = self.compute_url("flavors/detail");
        let resp = self
            .send(
                self.request(Method::GET, &url).query(&[("is_public", "true")]),
                OP,
            )
            .await?;
        let list: FlavorList = Self::json(resp, OP).await?;
        list.flavors
            .into_iter()
            .find(|f| f.name == name)
            .map(|f| f.id)
            .ok_or_else(|| {
                ProviderError::ResourceNotFound {
                    kind: ResourceKind::Flavor,
                    name: name.to_string(),
                }
                .into()
            })
    }

    async fn resolve_network(&self, name: &str) -> Result<String> {
        const OP: &str = "list networks";
        let url = join(&self.endpoints.network, "v2.0/networks");
        let resp = self
            .send(self.request(Method::GET, &url).query(&[("name", name)]), OP)
            .await?;
        let list: NetworkList = Self::json(resp, OP).await?;
        first_id(list.networks, ResourceKind::Network, name)
    }

    async fn create_instance(&self, request: &InstanceRequest) -> Result<RemoteInstance> {
        const OP: &str = "create server";
        let url = self.compute_url("servers");
        let resp = self
            .send(
                self.request(Method::POST, &url)
                    .json(&server_create_body(request)),
                OP,
            )
            .await?;
        let created: CreatedServer = Self::json(resp, OP).await?;

        // The create response carries only the ID.
        let fetched = self
            .get_instance(&created.server.id)
            .await
            .with_context(|| format!("failed to fetch new server {}", created.server.id))?;
        Ok(fetched.unwrap_or_else(|| RemoteInstance {
            id: created.server.id,
            name: request.name.clone(),
            status: InstanceStatus::Build,
            metadata: request.metadata.clone(),
            addresses: std::collections::BTreeMap::new(),
            created: None,
        }))
    }

    async fn list_instances(&self) -> Result<Vec<RemoteInstance>> {
        const OP: &str = "list servers";
        let mut url = self.compute_url("servers/detail");
        let mut all = Vec::new();
        loop {
            let resp = self.send(self.request(Method::GET, &url), OP).await?;
            let page: ServerList = Self::json(resp, OP).await?;
            all.extend(page.servers);
            match next_link(&page.servers_links) {
                Some(next) if next != url => url = next,
                _ => break,
            }
        }
        Ok(all)
    }

    async fn get_instance(&self, id: &str) -> Result<Option<RemoteInstance>> {
        const OP: &str = "get server";
        let url = self.compute_item_url("servers", id)?;
        let resp = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                operation: OP,
                reason: e.to_string(),
            })?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(resp, OP).await?;
        let envelope: ServerEnvelope = Self::json(resp, OP).await?;
        Ok(Some(envelope.server))
    }

    async fn delete_instance(&self, id: &str) -> Result<()> {
        let url = self.compute_item_url("servers", id)?;
        self.send(self.request(Method::DELETE, &url), "delete server")
            .await?;
        Ok(())
    }

    async fn create_keypair(&self, name: &str, public_key: &str) -> Result<()> {
        let url = self.compute_url("os-keypairs");
        let body = json!({ "keypair": { "name": name, "public_key": public_key.trim_end() } });
        self.send(self.request(Method::POST, &url).json(&body), "create keypair")
            .await?;
        Ok(())
    }

    async fn delete_keypair(&self, name: &str) -> Result<()> {
        let url = self.compute_item_url("os-keypairs", name)?;
        self.send(self.request(Method::DELETE, &url), "delete keypair")
            .await?;
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn build_http_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("tins/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")
}

async fn check_status(resp: Response, operation: &'static str) -> Result<Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(operation, status = status.as_u16(), %body, "openstack error response");
    Err(ProviderError::Api {
        operation,
        status: status.as_u16(),
        body,
    })
}

/// Keystone v3 base URL; `/v3` is appended when the configured URL lacks it.
fn identity_base(auth_url: &str) -> String {
    let trimmed = auth_url.trim_end_matches('/');
    if trimmed.ends_with("/v3") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v3")
    }
}

fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn item_url(base: &str, collection: &str, item: &str) -> Result<String> {
    let mut url = Url::parse(base).with_context(|| format!("invalid endpoint URL {base}"))?;
    url.path_segments_mut()
        .map_err(|()| anyhow::anyhow!("endpoint URL {base} cannot have a path"))?
        .pop_if_empty()
        .push(collection)
        .push(item);
    Ok(url.into())
}

fn auth_request_body(config: &ProviderConfig) -> serde_json::Value {
    json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": {
                    "user": {
                        "name": config.username,
                        "domain": { "name": config.domain_name },
                        "password": config.password,
                    }
                }
            },
            "scope": { "project": { "id": config.project_id } }
        }
    })
}

fn server_create_body(request: &InstanceRequest) -> serde_json::Value {
    let mut server = json!({
        "name": request.name,
        "imageRef": request.image_id,
        "flavorRef": request.flavor_id,
        "networks": [{ "uuid": request.network_id }],
        "availability_zone": request.availability_zone,
        "metadata": request.metadata,
        "user_data": BASE64.encode(request.user_data.as_bytes()),
    });
    if let Some(key_name) = &request.key_name {
        server["key_name"] = json!(key_name);
    }
    json!({ "server": server })
}

fn endpoints_from_catalog(catalog: &[CatalogEntry], region: &str) -> Result<Endpoints, ProviderError> {
    let find = |service: &'static str| {
        catalog
            .iter()
            .filter(|entry| entry.service_type == service)
            .flat_map(|entry| &entry.endpoints)
            .find(|ep| {
                ep.interface == "public"
                    && (ep.region_id.as_deref() == Some(region) || ep.region.as_deref() == Some(region))
            })
            .map(|ep| ep.url.clone())
            .ok_or_else(|| ProviderError::EndpointNotFound {
                service,
                region: region.to_string(),
            })
    };
    Ok(Endpoints {
        compute: find("compute")?,
        network: find("network")?,
        image: find("image")?,
    })
}

fn next_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| l.rel == "next")
        .map(|l| l.href.clone())
}

fn first_id(items: Vec<Named>, kind: ResourceKind, name: &str) -> Result<String> {
    items
        .into_iter()
        .next()
        .map(|n| n.id)
        .ok_or_else(|| {
            ProviderError::ResourceNotFound {
                kind,
                name: name.to_string(),
            }
            .into()
        })
}
