//! gRPC clients for the backend services
//!
//! Channels are lazily connected and shared; HTTP/2 multiplexing handles
//! concurrency, so one channel per service is enough.

use anyhow::{Context, Result};
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

use crate::config::ServiceEndpoints;

pub mod proto {
    pub mod auth {
        tonic::include_proto!("eventhub.auth_service.v1");
    }

    pub mod user {
        tonic::include_proto!("eventhub.user_service.v1");
    }

    pub mod event {
        tonic::include_proto!("eventhub.event_service.v1");
    }

    pub mod image {
        tonic::include_proto!("eventhub.image_service.v1");
    }

    pub mod csat {
        tonic::include_proto!("eventhub.csat_service.v1");
    }
}

use proto::auth::auth_service_client::AuthServiceClient;
use proto::csat::csat_service_client::CsatServiceClient;
use proto::event::event_service_client::EventServiceClient;
use proto::image::image_service_client::ImageServiceClient;
use proto::user::user_service_client::UserServiceClient;

/// Headroom over the upload limit for the rest of the image message
const IMAGE_MESSAGE_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct ServiceClients {
    auth: Channel,
    user: Channel,
    event: Channel,
    image: Channel,
    csat: Channel,
    image_message_limit: usize,
}

impl ServiceClients {
    /// Build lazily connected channels; fails only on malformed URLs
    pub fn new(endpoints: &ServiceEndpoints, max_upload_bytes: usize) -> Result<Self> {
        let channel = |name: &str, url: &str| -> Result<Channel> {
            Ok(Endpoint::from_shared(url.to_string())
                .with_context(|| format!("Invalid {} endpoint: {}", name, url))?
                .connect_timeout(Duration::from_secs(endpoints.connect_timeout_secs))
                .timeout(Duration::from_secs(endpoints.request_timeout_secs))
                .http2_keep_alive_interval(Duration::from_secs(60))
                .keep_alive_timeout(Duration::from_secs(20))
                .keep_alive_while_idle(true)
                .connect_lazy())
        };

        Ok(Self {
            auth: channel("auth-service", &endpoints.auth_url)?,
            user: channel("user-service", &endpoints.user_url)?,
            event: channel("event-service", &endpoints.event_url)?,
            image: channel("image-service", &endpoints.image_url)?,
            csat: channel("csat-service", &endpoints.csat_url)?,
            image_message_limit: max_upload_bytes + IMAGE_MESSAGE_OVERHEAD,
        })
    }

    pub fn auth_client(&self) -> AuthServiceClient<Channel> {
        AuthServiceClient::new(self.auth.clone())
    }

    pub fn user_client(&self) -> UserServiceClient<Channel> {
        UserServiceClient::new(self.user.clone())
    }

    pub fn event_client(&self) -> EventServiceClient<Channel> {
        EventServiceClient::new(self.event.clone())
    }

    /// Image payloads exceed tonic's 4 MiB default in both directions
    pub fn image_client(&self) -> ImageServiceClient<Channel> {
        ImageServiceClient::new(self.image.clone())
            .max_decoding_message_size(self.image_message_limit)
            .max_encoding_message_size(self.image_message_limit)
    }

    pub fn csat_client(&self) -> CsatServiceClient<Channel> {
        CsatServiceClient::new(self.csat.clone())
    }
}
