//! Wires a small notification service.
//!
//! Run with `RUST_LOG=wirebox_container=debug` to watch the generations.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use wirebox::Injectable;
use wirebox::prelude::*;

// === Capabilities ===

trait Repository: Send + Sync {
    fn recipients(&self) -> Vec<String>;
}

trait Notifier: Send + Sync {
    fn send(&self, to: &str, message: &str) -> String;
}

// === Types ===

#[derive(Injectable)]
#[injectable(capability = "dyn Repository")]
struct RepositoryStubImpl;

impl Repository for RepositoryStubImpl {
    fn recipients(&self) -> Vec<String> {
        vec!["alice".into(), "bob".into()]
    }
}

#[derive(Injectable)]
#[injectable(capability = "dyn Notifier")]
struct SmsClient {
    #[inject(value = "smsUrl")]
    url: String,
}

impl Notifier for SmsClient {
    fn send(&self, to: &str, message: &str) -> String {
        format!("POST {} to={to} body={message:?}", self.url)
    }
}

#[derive(Injectable)]
struct PushClient {
    #[inject(value = "pushUrl")]
    url: String,
}

#[derive(Injectable)]
struct Service {
    repository: Arc<dyn Repository>,
    notifier: Arc<dyn Notifier>,
    push: Arc<PushClient>,
}

impl Service {
    fn broadcast(&self, message: &str) -> Vec<String> {
        self.repository
            .recipients()
            .iter()
            .flat_map(|to| {
                [
                    self.notifier.send(to, message),
                    format!("PUSH {} to={to}", self.push.url),
                ]
            })
            .collect()
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("notifications=info,wirebox_container=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut container = Container::new();
    container
        .register_value("smsUrl", String::from("https://sms.example.com/send"))?
        .register_value("pushUrl", String::from("https://push.example.com/v1"))?
        .register::<Service>()?
        .register::<SmsClient>()?
        .register::<PushClient>()?
        .register::<RepositoryStubImpl>()?;

    let store = container.build()?;

    println!("{}", store.report());

    let service = store.resolve::<Service>()?;
    let sent = service.broadcast("deploy finished");
    info!(messages = sent.len(), "Broadcast sent");
    for line in sent {
        println!("{line}");
    }

    Ok(())
}
