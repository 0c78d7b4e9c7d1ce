//! Walkthrough of the Tessera value model.
//!
//! Registers a pretend storage bucket, derives a few deferred values from
//! it, and shows what the engine would receive and what a program would
//! read back.
//!
//! # Usage
//!
//! ```bash
//! TESSERA_DRY_RUN=true RUST_LOG=debug walkthrough
//! ```
//!
//! The run mode and wire features come from the `TESSERA_*` environment
//! variables; with none set this is an update against an engine with no
//! optional wire support.

use futures::future;
use indexmap::IndexMap;
use serde_json::{Value, json};
use tessera_core::RunContext;
use tessera_output::input::{Input, InputType};
use tessera_output::output::Output;
use tessera_output::resource::{Resource, ResourceHandle, ResourceSet};
use tessera_rpc::decode::PropertyDecoder;
use tessera_rpc::encode::PropertyEncoder;
use tracing_subscriber::EnvFilter;

/// A storage bucket whose id is only known after an update.
struct Bucket {
    urn: Output,
    id: Output,
}

impl Bucket {
    fn register(ctx: &RunContext, name: &str) -> ResourceHandle {
        let urn = format!("urn:tessera:dev::site::storage:Bucket::{name}");
        let id = if ctx.is_preview() {
            Output::unknown()
        } else {
            let id = format!("{name}-7f3a");
            Output::new(
                ResourceSet::new(),
                async move {
                    tokio::task::yield_now().await;
                    Ok(json!(id))
                },
                future::ready(Ok(true)),
            )
        };
        ResourceHandle::new(Self {
            urn: Output::from_value(json!(urn)),
            id,
        })
    }
}

impl Resource for Bucket {
    fn urn(&self) -> &Output {
        &self.urn
    }

    fn id(&self) -> Option<&Output> {
        Some(&self.id)
    }
}

#[derive(InputType)]
#[input(name = "site:index:WebsiteArgs")]
struct WebsiteArgs {
    bucket: Input,
    #[input(name = "bucketId")]
    bucket_id: Input,
    #[input(name = "indexDocument")]
    index_document: Input,
    endpoint: Input,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let ctx = match RunContext::from_env() {
        Ok(ctx) => ctx,
        Err(err) => {
            tracing::error!(error = %err, "invalid run configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(preview = ctx.is_preview(), features = ?ctx.features(), "starting walkthrough");

    let bucket = Bucket::register(&ctx, "assets");
    let bucket_id = bucket.id().cloned().unwrap_or_else(Output::unknown);
    let endpoint = Output::concat([
        Input::from("https://"),
        bucket_id.clone().into(),
        Input::from(".storage.example.com"),
    ]);
    let shout = endpoint.apply(&ctx, |url| match url {
        Value::String(url) => json!(url.to_uppercase()),
        other => other,
    });

    let website = WebsiteArgs {
        bucket: (&bucket).into(),
        bucket_id: bucket_id.into(),
        index_document: "index.html".into(),
        endpoint: endpoint.clone().into(),
    };

    let props: IndexMap<String, Input> = IndexMap::from_iter([
        ("website".to_owned(), Input::from(website.into_args())),
        ("banner".to_owned(), shout.into()),
        ("apiKey".to_owned(), Output::secret("hunter2").into()),
    ]);

    let encoder = PropertyEncoder::new(ctx).with_output_values(true);
    let encoded = match encoder.encode_properties(&props).await {
        Ok(encoded) => encoded,
        Err(err) => {
            tracing::error!(error = %err, "failed to encode properties");
            std::process::exit(1);
        }
    };
    for (name, deps) in &encoded.dependencies {
        tracing::info!(property = %name, dependencies = deps.len(), "recorded dependencies");
    }
    tracing::info!(
        wire = %serde_json::Value::Object(encoded.properties.clone()),
        "encoded properties"
    );

    match PropertyDecoder::new(ctx).decode_properties(&encoded.properties) {
        Ok(decoded) => {
            tracing::info!(program = %serde_json::Value::Object(decoded), "decoded properties");
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to decode properties");
            std::process::exit(1);
        }
    }

    match endpoint.future().await {
        Ok(Some(url)) => tracing::info!(%url, "endpoint resolved"),
        Ok(None) => tracing::info!("endpoint is not known during this run"),
        Err(err) => tracing::error!(error = %err, "endpoint failed"),
    }
}
