use crate::api::routes;
use crate::config::SharedConfig;
use crate::dns::RecordService;
use std::future::Future;
use std::net::SocketAddr;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub records: RecordService,
}

pub fn new(
    config: SharedConfig,
    records: RecordService,
    shutdown: impl Future<Output = ()>,
) -> hyper::Result<impl Future<Output = hyper::Result<()>>> {
    let server = axum::Server::try_bind(&config.api_bind_addr)?
        .serve(
            routes::new(AppState { config, records })
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown);
    Ok(server)
}
