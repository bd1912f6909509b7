use clap::{Args, Parser, Subcommand};
use fitlife_api::{AppState, PredictResponse, RestApi};
use fitlife_core::{CanonicalFeatures, RawQuery};
use fitlife_storage::{PlanService, RecommendArtifact, RecommenderService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Workout plan prediction and routine recommendation service
#[derive(Parser, Debug)]
#[command(name = "fitlife")]
#[command(about = "Workout plan prediction and routine recommendation", long_about = None)]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the artifacts and serve HTTP
    Serve(ServeArgs),
    /// Run a single plan prediction and print it as JSON
    Predict {
        #[command(flatten)]
        plan: PlanArtifactArg,

        /// Request body, either dialect
        #[arg(long)]
        features: String,
    },
    /// Fit the catalog encoder and write a recommend artifact
    BuildRecommender {
        /// Routine catalog (JSON array)
        #[arg(long)]
        catalog: PathBuf,

        /// Output artifact (.json or .json.gz)
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct PlanArtifactArg {
    /// Plan artifact (mandatory)
    #[arg(long, env = "FITLIFE_SK_MODEL", default_value = "./fitlife_sklearn_model.json")]
    plan_artifact: PathBuf,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    plan: PlanArtifactArg,

    /// Recommend artifact (optional, loaded on first use)
    #[arg(long, env = "FITLIFE_KNN_MODEL", default_value = "./fitlife_knn_model.json")]
    recommend_artifact: PathBuf,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, default_value_t = 8000)]
    http_port: u16,

    /// Include error details in 500 responses
    #[arg(long)]
    expose_errors: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Predict { plan, features } => predict(plan, &features),
        Command::BuildRecommender { catalog, out } => {
            let written = RecommendArtifact::build_from_file(&catalog, &out)?;
            info!("Recommender written to {:?} ({} bytes)", written.path, written.size);
            Ok(())
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    info!("Starting FitLife v{}", env!("CARGO_PKG_VERSION"));
    info!("Plan artifact: {:?}", args.plan.plan_artifact);
    info!("Recommend artifact: {:?}", args.recommend_artifact);

    // refuse to serve without the plan models
    let plan = Arc::new(PlanService::load(&args.plan.plan_artifact)?);
    info!("Plan models loaded, version {}", plan.version());

    let recommender = Arc::new(RecommenderService::new(args.recommend_artifact));
    if !recommender.is_present() {
        tracing::warn!("Recommend artifact not found; /recommend will return empty results");
    }

    let state = AppState::new(plan, recommender).with_exposed_errors(args.expose_errors);
    let host = args.host;
    let http_port = args.http_port;

    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, host, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("FitLife started successfully");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn predict(plan: PlanArtifactArg, features: &str) -> anyhow::Result<()> {
    let service = PlanService::load(&plan.plan_artifact)?;
    let raw: RawQuery = serde_json::from_str(features)?;
    let canonical = CanonicalFeatures::from_raw(raw);
    info!("Resolved features {:?}", canonical.as_array());

    let prediction = service.predict(&canonical)?;
    let response = PredictResponse::new(prediction, service.version());
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
