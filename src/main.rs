use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use script_previz::analysis::{AnalysisClient, Provenance};
use script_previz::api::{ContentService, GeminiClient};
use script_previz::config::PipelineConfig;
use script_previz::generation::{AssetRequest, Orchestrator, Session};
use script_previz::prompt::{AspectRatio, CharacterView, IntentParams, MerchProduct};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "script-previz")]
#[command(about = "Screenplay breakdown and pre-visualization asset generation", long_about = None)]
struct Cli {
    /// Gemini API key (omit to run offline with placeholder images)
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Ignore any configured API key
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Break a script down into scenes, characters and a tension curve
    Analyze(AnalyzeArgs),
    /// Generate a free-standing poster, character, scene or merchandise image
    Asset(AssetArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Script text
    #[arg(short, long)]
    text: Option<String>,

    /// Script file path
    #[arg(short, long)]
    file: Option<String>,

    /// Also materialize an image for every scene
    #[arg(long)]
    materialize: bool,

    /// Write the JSON result here instead of stdout
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Args, Debug)]
struct AssetArgs {
    #[arg(long, value_enum)]
    intent: IntentArg,

    /// What to depict
    #[arg(short, long)]
    prompt: String,

    /// Poster title overlay
    #[arg(long)]
    title: Option<String>,

    /// Poster composition
    #[arg(long, value_enum, default_value = "portrait")]
    ratio: RatioArg,

    #[arg(long, default_value = "female")]
    gender: String,

    /// Character sheet layout
    #[arg(long, value_enum, default_value = "portrait")]
    view: ViewArg,

    #[arg(long, default_value = "day")]
    time: String,

    #[arg(long, default_value = "sunny")]
    weather: String,

    #[arg(long, value_enum, default_value = "blindbox")]
    product: ProductArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IntentArg {
    Poster,
    Character,
    Scene,
    Merchandise,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RatioArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ViewArg {
    Portrait,
    ThreeView,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProductArg {
    Blindbox,
    Plush,
    Poster,
    AppSplash,
}

impl AssetArgs {
    fn params(&self) -> IntentParams {
        match self.intent {
            IntentArg::Poster => IntentParams::Poster {
                title: self.title.clone(),
                aspect_ratio: match self.ratio {
                    RatioArg::Portrait => AspectRatio::Portrait,
                    RatioArg::Landscape => AspectRatio::Landscape,
                },
            },
            IntentArg::Character => IntentParams::Character {
                gender: self.gender.clone(),
                view: match self.view {
                    ViewArg::Portrait => CharacterView::Portrait,
                    ViewArg::ThreeView => CharacterView::ThreeView,
                },
            },
            IntentArg::Scene => IntentParams::Scene {
                time_of_day: self.time.clone(),
                weather: self.weather.clone(),
            },
            IntentArg::Merchandise => IntentParams::Merchandise {
                product: match self.product {
                    ProductArg::Blindbox => MerchProduct::Blindbox,
                    ProductArg::Plush => MerchProduct::Plush,
                    ProductArg::Poster => MerchProduct::Poster,
                    ProductArg::AppSplash => MerchProduct::AppSplash,
                },
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量（需要在解析参数前，clap 会读取 GEMINI_API_KEY）
    dotenvy::dotenv().ok();

    // 初始化日志，输出到 stderr，stdout 只留给 JSON 结果
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = PipelineConfig::from_env();
    if cli.offline {
        config = config.with_api_key(None);
    } else if let Some(key) = cli.api_key.clone() {
        config = config.with_api_key(Some(key));
    }

    let service: Arc<dyn ContentService> = Arc::new(
        GeminiClient::new(config.api_key.clone()).context("Failed to create HTTP client")?,
    );

    let outcome = match cli.command {
        Command::Analyze(args) => run_analysis(args, service, &config).await,
        Command::Asset(args) => run_asset(args, service, &config).await,
    };

    if let Err(e) = outcome {
        error!("Pipeline failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run_analysis(
    args: AnalyzeArgs,
    service: Arc<dyn ContentService>,
    config: &PipelineConfig,
) -> anyhow::Result<()> {
    // 获取输入文本
    let script = if let Some(text) = args.text {
        text
    } else if let Some(file_path) = args.file {
        tokio::fs::read_to_string(&file_path)
            .await
            .with_context(|| format!("Failed to read file: {}", file_path))?
    } else {
        anyhow::bail!("Either --text or --file must be provided");
    };

    let session = Session::new();
    let client = AnalysisClient::new(Arc::clone(&service), config);

    info!("Step 1/2: Analyzing script...");
    let analyzed = client.analyze_detailed(&script).await?;
    session.install_analysis(analyzed.analysis);

    if args.materialize {
        info!("Step 2/2: Materializing scene images...");
        let orchestrator = Orchestrator::new(service, config);
        orchestrator.materialize_all(&session).await?;
    } else {
        info!("Step 2/2: Skipped scene materialization");
    }

    let analysis = session
        .analysis()
        .context("analysis missing from session")?;
    let provenance = match analyzed.provenance {
        Provenance::Live => json!({ "source": "live" }),
        Provenance::Fallback { reason } => json!({ "source": "fallback", "reason": reason }),
    };
    let report = json!({
        "provenance": provenance,
        "summary": analysis.summary(),
        "analysis": analysis,
    });

    let rendered = serde_json::to_string_pretty(&report)?;
    match args.output {
        Some(path) => {
            tokio::fs::write(&path, rendered)
                .await
                .with_context(|| format!("Failed to write {}", path))?;
            info!("Analysis written to: {}", path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

async fn run_asset(
    args: AssetArgs,
    service: Arc<dyn ContentService>,
    config: &PipelineConfig,
) -> anyhow::Result<()> {
    let session = Session::new();
    let orchestrator = Orchestrator::new(service, config);

    let request = AssetRequest::new(args.params(), args.prompt.clone());
    let asset = orchestrator.generate_asset(&session, request).await?;

    println!("{}", serde_json::to_string_pretty(&asset)?);
    session.close();
    Ok(())
}
