use crate::config::Environment;
use tracing::Subscriber;
use tracing_subscriber::{
    layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer,
};

pub fn init_logger(environment: Environment, verbose: bool) {
    let default_filter = if verbose {
        "rekognizer=debug,tower_http=debug,info"
    } else {
        "rekognizer=info,tower_http=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);

    match environment {
        Environment::Development => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .init(),
        Environment::Production => registry.with(json_layer()).init(),
    }
}

// 正式環境輸出 JSON 方便日誌收集
fn json_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_target(true)
        .json()
        .with_current_span(false)
}
