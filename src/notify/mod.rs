

pub mod message;
pub mod routing;
pub mod slack;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use message::RichMessage;
pub use routing::ChannelRouter;
pub use slack::SlackNotifier;


#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Slack rejected message: {0}")]
    Rejected(String),

    #[error("No channel configured for project '{0}'")]
    UnknownChannel(String),
}


#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, channel: &str, message: &RichMessage) -> Result<(), DeliveryError>;
}


#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    async fn deliver(&self, channel: &str, message: &RichMessage) -> Result<(), DeliveryError> {
        (**self).deliver(channel, message).await
    }
}
