//! Single entry point that routes a request to the matching transport adapter.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::adapters::{GraphQlAdapter, RestAdapter, RpcAdapter, RpcClients};
use crate::config::BenchConfig;
use crate::content::ResultEnvelope;
use crate::errors::BenchError;
use crate::http::{HttpClient, ReqwestHttpClient};
use crate::media::MediaStore;
use crate::model::{RequestSpec, ServiceKind, TransportKind};

/// Routes requests to the REST, GraphQL or gRPC-Web adapter.
///
/// Holds no per-call state, so one dispatcher can serve any number of
/// concurrent calls.
pub struct Dispatcher {
    rest: RestAdapter,
    graphql: GraphQlAdapter,
    rpc: RpcAdapter,
    media: MediaStore,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Dispatcher using reqwest and the given configuration.
    pub fn from_config(config: BenchConfig) -> Result<Self, BenchError> {
        Self::builder().config(config).build()
    }

    /// Store that owns every media handle this dispatcher hands out.
    pub fn media_store(&self) -> &MediaStore {
        &self.media
    }

    /// Parses the three user-facing strings and performs one request.
    ///
    /// The transport is validated first, then the service, then the size; all
    /// before any network call.
    pub async fn fetch_service(
        &self,
        transport: &str,
        service: &str,
        size: &str,
    ) -> Result<ResultEnvelope, BenchError> {
        let spec = parse_spec(transport, service, size)?;
        self.fetch(&spec).await
    }

    /// Performs one request described by `spec`.
    pub async fn fetch(&self, spec: &RequestSpec) -> Result<ResultEnvelope, BenchError> {
        debug!(event = "dispatch.started", transport = %spec.transport, request = %spec);
        let result = match spec.transport {
            TransportKind::Rest => self.rest.fetch(spec).await,
            TransportKind::GraphQl => self.graphql.fetch(spec).await,
            TransportKind::BinaryRpc => self.rpc.fetch(spec).await,
        };
        if let Err(err) = &result {
            warn!(
                event = "dispatch.failed",
                transport = %spec.transport,
                request = %spec,
                code = err.code(),
                error = %err
            );
        }
        result
    }

    /// Issues `count` identical requests concurrently.
    ///
    /// Results keep request order. The first failure fails the whole call and
    /// the remaining in-flight requests are dropped.
    pub async fn fetch_service_parallel(
        &self,
        transport: &str,
        service: &str,
        size: &str,
        count: usize,
    ) -> Result<Vec<ResultEnvelope>, BenchError> {
        let spec = parse_spec(transport, service, size)?;
        spec.selector()?;
        try_join_all((0..count).map(|_| self.fetch(&spec))).await
    }
}

fn parse_spec(transport: &str, service: &str, size: &str) -> Result<RequestSpec, BenchError> {
    let transport: TransportKind = transport.parse()?;
    let service: ServiceKind = service.parse()?;
    let size = Some(size).filter(|s| !s.trim().is_empty());
    Ok(RequestSpec::new(transport, service, size))
}

/// Builder for [`Dispatcher`]; every collaborator can be substituted.
#[derive(Default)]
pub struct DispatcherBuilder {
    config: BenchConfig,
    http: Option<Arc<dyn HttpClient>>,
    rpc_clients: Option<RpcClients>,
    media: Option<MediaStore>,
}

impl DispatcherBuilder {
    pub fn config(mut self, config: BenchConfig) -> Self {
        self.config = config;
        self
    }

    /// HTTP client shared by all adapters; defaults to [`ReqwestHttpClient`].
    pub fn http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Pre-built RPC stubs; defaults to stubs on the shared HTTP client.
    pub fn rpc_clients(mut self, clients: RpcClients) -> Self {
        self.rpc_clients = Some(clients);
        self
    }

    pub fn media_store(mut self, media: MediaStore) -> Self {
        self.media = Some(media);
        self
    }

    pub fn build(self) -> Result<Dispatcher, BenchError> {
        let config = self.config;
        let http: Arc<dyn HttpClient> = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestHttpClient::new(config.timeout)?),
        };
        let media = self.media.unwrap_or_default();
        let rpc_clients = self
            .rpc_clients
            .unwrap_or_else(|| RpcClients::connect(http.clone(), config.rpc_base_url.clone()));
        Ok(Dispatcher {
            rest: RestAdapter::new(http.clone(), config.rest_base_url.clone(), media.clone()),
            graphql: GraphQlAdapter::new(
                http,
                config.graphql_url.clone(),
                config.graphql_dialect,
                media.clone(),
            ),
            rpc: RpcAdapter::new(rpc_clients, media.clone()),
            media,
        })
    }
}
