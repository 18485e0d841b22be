use std::{net::SocketAddr, sync::Arc};

use axum::http::HeaderValue;
use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    config::AppConfig,
    store::{self, SubscriptionStore},
    Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Builds the store once for the whole process and binds the listener.
    pub async fn build_from_config(config: &AppConfig) -> Result<Self> {
        let store = store::init_store(config).await?;
        let allow_origin = config.net_config.allow_origin_header()?;
        let app_state = AppState::new(store, allow_origin);

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        Ok(App::new(app_state, listener))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

pub struct InternalState {
    pub store: Box<dyn SubscriptionStore>,
    pub allow_origin: HeaderValue,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(store: Box<dyn SubscriptionStore>, allow_origin: HeaderValue) -> Self {
        AppState(Arc::new(InternalState {
            store,
            allow_origin,
        }))
    }
}
