use crate::config::Config;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
};
use log::{error, info};
use models::mail::MailData;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinHandle,
};

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to read template: {0}")]
    Template(#[from] std::io::Error),

    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Sending half of the outgoing mail queue
#[derive(Debug, Clone)]
pub struct MailQueue {
    sender: UnboundedSender<MailData>,
}

impl MailQueue {
    pub fn new() -> (Self, UnboundedReceiver<MailData>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Queues `mail` for the worker. Failures are logged, never returned to the caller.
    pub fn send(&self, mail: MailData) {
        if let Err(e) = self.sender.send(mail) {
            error!("Failed to queue mail to {}: worker stopped", e.0.to);
        }
    }
}

/// Drains the queue one message at a time until every sender is dropped
pub fn spawn_worker(config: Arc<Config>, mut receiver: UnboundedReceiver<MailData>) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Mail worker started");

        while let Some(mail) = receiver.recv().await {
            match deliver(&config, &mail).await {
                Ok(()) => info!("Sent \"{}\" to {}", mail.subject, mail.to),
                Err(e) => error!("Failed to send \"{}\" to {}: {e}", mail.subject, mail.to),
            }
        }

        info!("Mail worker stopped");
    })
}

async fn deliver(config: &Config, mail: &MailData) -> Result<(), MailError> {
    let body = match &mail.template {
        Some(name) => {
            let template = tokio::fs::read_to_string(config.email_template_dir.join(name)).await?;
            mail.render_with(&template)
        }
        None => mail.content.clone(),
    };

    let message = Message::builder()
        .from(mail.from.parse()?)
        .to(mail.to.parse()?)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(body)?;

    // A fresh connection per message
    let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp_host.as_str())
        .port(config.smtp_port)
        .timeout(Some(SMTP_TIMEOUT))
        .build();

    transport.send(message).await?;

    Ok(())
}
