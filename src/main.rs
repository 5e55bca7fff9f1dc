use clap::Parser;
use rekognizer::adapters::{FacenetClient, HttpFaceDetector, HttpImageSource, PgEmbeddingStore};
use rekognizer::config::{Command, MigrateCommand};
use rekognizer::utils::error::ErrorSeverity;
use rekognizer::utils::{logger, validation::Validate};
use rekognizer::{api, Cli, RekognizerError, RekognizerService, ServiceConfig, ServiceSettings};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 載入配置
    let mut config = match ServiceConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    if let Some(env) = cli.env {
        config.environment = env;
    }

    // 初始化日誌
    logger::init_logger(config.environment, cli.verbose);
    tracing::info!("Starting rekognizer ({:?})", config.environment);
    tracing::debug!("Loaded configuration from {}", cli.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, config).await {
        tracing::error!(
            "❌ rekognizer failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(command: Command, config: ServiceConfig) -> Result<(), RekognizerError> {
    match command {
        Command::CheckConfig => {
            println!("✅ Configuration is valid");
            Ok(())
        }
        Command::Migrate { action } => {
            let store = PgEmbeddingStore::connect(&config.database).await?;
            match action {
                MigrateCommand::Up => {
                    store.upgrade().await?;
                    tracing::info!(
                        "✅ Database upgraded, applied versions: {:?}",
                        store.applied_versions().await?
                    );
                }
                MigrateCommand::Down { target } => {
                    let target = store.downgrade(target).await?;
                    tracing::info!("✅ Database downgraded to version {}", target);
                }
            }
            Ok(())
        }
        Command::Serve { bind } => {
            let store = PgEmbeddingStore::connect(&config.database).await?;
            let service = RekognizerService::new(
                Arc::new(HttpImageSource::new(&config.images)?),
                Arc::new(HttpFaceDetector::new(&config.detector)?),
                Arc::new(FacenetClient::new(&config.facenet)?),
                Arc::new(store),
                ServiceSettings::from(&config),
            );
            tracing::info!(
                "Facenet at {}, detector at {}",
                config.facenet.predict_url(),
                config.detector.endpoint
            );

            let app = api::create_app(Arc::new(service), &config.cors)?;
            let bind_address = bind.unwrap_or(config.server.bind_address);
            api::serve(app, &bind_address).await
        }
    }
}
