use tokio::io::AsyncReadExt;
use tracing::info;

use crate::cli::{ParseArgs, SendArgs};
use notifybox::providers::{HttpConfig, Message, ProviderRegistry};
use notifybox::router::{DispatchReport, FallbackOptions, Router, RouterOptions, SendOptions};
use notifybox::uri;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn send(args: SendArgs) -> Result<(), AnyError> {
    let body = match args.body {
        Some(body) => body,
        None => read_stdin().await?,
    };

    let mut options = RouterOptions::new()
        .skip_builtins(args.no_builtins)
        .skip_env(args.no_env);
    for url in args.urls {
        options = options.url(url);
    }
    for path in args.config {
        options = options.config_path(path);
    }
    if !args.fallback_tags.is_empty() {
        options = options.on_error(FallbackOptions::new().fallback_tags(args.fallback_tags));
    }
    let router = Router::new(options)?;

    let mut message = Message::new(body);
    if let Some(title) = args.title {
        message = message.with_title(title);
    }

    let mut send_options = SendOptions::new();
    if !args.tags.is_empty() {
        send_options = send_options.tags(args.tags);
    }
    for (key, value) in args.params {
        send_options = send_options.param(key, value);
    }

    let results = router.send(&message, &send_options).await;
    let reports: Vec<DispatchReport> = results.iter().map(|result| result.report()).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            let status = if report.success { "ok" } else { "FAILED" };
            match &report.error {
                Some(error) => println!("{status:<6} {:<10} {} ({error})", report.provider_id, report.url),
                None => println!("{status:<6} {:<10} {}", report.provider_id, report.url),
            }
        }
    }

    let stats = router.stats();
    info!(
        succeeded = stats.succeeded,
        failed = stats.failed,
        fallbacks_sent = stats.fallbacks_sent,
        "Send finished"
    );

    if results.is_empty() {
        return Err("no destinations selected".into());
    }
    if stats.failed > 0 {
        return Err(format!("{} of {} destinations failed", stats.failed, results.len()).into());
    }
    Ok(())
}

pub fn parse(args: ParseArgs) -> Result<(), AnyError> {
    let registry = ProviderRegistry::with_builtins(&HttpConfig::default())?;

    let parsed = match uri::scheme_of(&args.url).and_then(|scheme| registry.resolve(&scheme)) {
        Some(provider) => provider.decompose(&args.url)?,
        None => uri::decompose(&args.url)?,
    };

    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

pub fn providers() -> Result<(), AnyError> {
    let registry = ProviderRegistry::with_builtins(&HttpConfig::default())?;

    for (id, schemes) in registry.listing() {
        println!("{id:<10} {}", schemes.join(", "));
    }
    Ok(())
}

async fn read_stdin() -> Result<String, AnyError> {
    let mut body = String::new();
    tokio::io::stdin().read_to_string(&mut body).await?;
    Ok(body.trim_end().to_string())
}
