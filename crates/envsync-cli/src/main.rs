//! envsync - environment resolution and negotiation CLI
//!
//! ## Commands
//!
//! - `resolve`: find a directory environment on the `environmentpath`
//! - `respond`: show the HTTP response the master would send for an environment
//! - `negotiate`: decide an agent pass from an assumed and a server environment
//! - `classify`: ask the configured classifier about a node
//! - `agent`: run the agent loop against an in-process master

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use envsync_classifier::{
    Classifier, ClassifierGateway, EnvironmentName, HttpClassifier, HttpClassifierConfig, NodeId,
    StaticClassifier,
};
use envsync_core::settings::{Settings, DEFAULT_ENVIRONMENT, DEFAULT_ENVIRONMENTPATH};
use envsync_core::{
    negotiate, resolve, respond_environment, AgentRunner, EnglishLocalizer, LocalMaster,
    Localizer, LogFormat, NegotiationInput, SearchPath, ServerReport,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "envsync")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Directory environment resolution and agent negotiation", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Search path for directory environments (OS path-list separated)
    #[arg(
        long,
        global = true,
        env = "ENVSYNC_ENVIRONMENTPATH",
        default_value = DEFAULT_ENVIRONMENTPATH
    )]
    environmentpath: String,

    #[command(subcommand)]
    command: Commands,
}

/// Where classifications come from. Neither flag means no classifier; a
/// classification file takes precedence over the service URL.
#[derive(clap::Args, Debug, Default)]
struct ClassifierArgs {
    /// Classifier service base URL
    #[arg(long, env = "ENVSYNC_CLASSIFIER_URL")]
    classifier_url: Option<String>,

    /// Classifier request timeout in seconds
    #[arg(long, env = "ENVSYNC_CLASSIFIER_TIMEOUT")]
    classifier_timeout: Option<u64>,

    /// JSON file mapping node names to classifications
    #[arg(long)]
    classification: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an environment name to its directory
    Resolve {
        /// Environment name
        name: String,
    },

    /// Print the master's HTTP response for an environment request
    Respond {
        /// Environment name (validated by the master)
        name: String,
    },

    /// Negotiate one agent pass
    Negotiate {
        /// Environment the agent assumed locally
        #[arg(long)]
        assumed: String,

        /// Environment the server reported
        #[arg(long)]
        server: String,

        /// Server reported the environment as not found
        #[arg(long)]
        not_found: bool,

        /// Locale tag sent by the server
        #[arg(long)]
        locale: Option<String>,
    },

    /// Classify a node
    Classify {
        /// Node certname
        node: String,

        /// Environment configured on the agent
        #[arg(short, long, env = "ENVSYNC_ENVIRONMENT", default_value = DEFAULT_ENVIRONMENT)]
        environment: String,

        #[command(flatten)]
        classifier: ClassifierArgs,
    },

    /// Run the agent loop against an in-process master
    Agent {
        /// Node certname
        #[arg(long, env = "ENVSYNC_NODE", default_value = "localhost")]
        node: String,

        /// Environment configured on the agent
        #[arg(short, long, env = "ENVSYNC_ENVIRONMENT", default_value = DEFAULT_ENVIRONMENT)]
        environment: String,

        /// Environment catalogs compile in when the assigned one is missing
        #[arg(long, default_value = DEFAULT_ENVIRONMENT)]
        default_environment: String,

        /// Locale tag the master attaches to its reports
        #[arg(long)]
        locale: Option<String>,

        #[command(flatten)]
        classifier: ClassifierArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    envsync_core::init_tracing(LogFormat::from_flag(cli.json), level);

    let search_path = SearchPath::parse(&cli.environmentpath);

    match cli.command {
        Commands::Resolve { name } => cmd_resolve(&name, &search_path),
        Commands::Respond { name } => cmd_respond(&name, &search_path),
        Commands::Negotiate {
            assumed,
            server,
            not_found,
            locale,
        } => cmd_negotiate(&assumed, &server, not_found, locale),
        Commands::Classify {
            node,
            environment,
            classifier,
        } => cmd_classify(&node, &environment, &classifier).await,
        Commands::Agent {
            node,
            environment,
            default_environment,
            locale,
            classifier,
        } => {
            let settings = Settings::new(
                &cli.environmentpath,
                &environment,
                classifier.classifier_url.clone(),
                &node,
            )
            .context("Invalid agent settings")?
            .with_default_environment(parse_environment(&default_environment)?);
            cmd_agent(&settings, locale, &classifier).await
        }
    }
}

fn parse_environment(raw: &str) -> Result<EnvironmentName> {
    EnvironmentName::parse(raw).with_context(|| format!("Invalid environment name '{}'", raw))
}

/// Build the classifier gateway. An explicit classification file wins over a
/// service URL, which may have come from the environment.
fn build_gateway(
    args: &ClassifierArgs,
    classifier_url: Option<&str>,
) -> Result<ClassifierGateway> {
    let classifier: Arc<dyn Classifier> = match (&args.classification, classifier_url) {
        (Some(path), _) => Arc::new(load_classification(path)?),
        (None, Some(url)) if !url.trim().is_empty() => {
            let mut config = HttpClassifierConfig::new(url);
            if let Some(secs) = args.classifier_timeout {
                config = config.with_timeout(secs);
            }
            Arc::new(HttpClassifier::new(config)?)
        }
        _ => return Ok(ClassifierGateway::absent()),
    };
    Ok(ClassifierGateway::new(classifier))
}

fn load_classification(path: &Path) -> Result<StaticClassifier> {
    StaticClassifier::from_json_file(path)
        .with_context(|| format!("Failed to load classifications from {:?}", path))
}

/// Resolve an environment and print its location
fn cmd_resolve(name: &str, search_path: &SearchPath) -> Result<()> {
    let name = parse_environment(name)?;
    let resolved = resolve(&name, search_path)?;

    println!("Environment: {}", resolved.name);
    println!("Path: {}", resolved.path.display());
    println!("Manifests: {}", if resolved.manifests { "yes" } else { "no" });
    println!("Modules: {}", if resolved.modules { "yes" } else { "no" });

    Ok(())
}

/// Print the response the master would produce
fn cmd_respond(name: &str, search_path: &SearchPath) -> Result<()> {
    let (status, content_type, body) = respond_environment(name, search_path).into_parts();

    println!(
        "HTTP {} {}",
        status.unwrap_or_default(),
        content_type.unwrap_or_default()
    );
    println!("{}", String::from_utf8_lossy(&body));

    Ok(())
}

fn cmd_negotiate(
    assumed: &str,
    server: &str,
    not_found: bool,
    locale: Option<String>,
) -> Result<()> {
    let report = ServerReport {
        environment: parse_environment(server)?,
        found: !not_found,
        locale,
    };
    let negotiation = negotiate(&NegotiationInput::new(parse_environment(assumed)?, report));

    println!("{}", serde_json::to_string_pretty(&negotiation)?);
    if let Some(diagnostic) = &negotiation.diagnostic {
        println!("{}", EnglishLocalizer.render(diagnostic));
    }

    Ok(())
}

async fn cmd_classify(node: &str, environment: &str, args: &ClassifierArgs) -> Result<()> {
    let gateway = build_gateway(args, args.classifier_url.as_deref())?;
    let configured = parse_environment(environment)?;

    let assigned = gateway
        .server_environment(&NodeId::new(node), &configured)
        .await
        .context("Failed to classify node")?;

    println!("Node: {}", node);
    println!(
        "Classifier: {}",
        if gateway.is_configured() {
            "configured"
        } else {
            "absent"
        }
    );
    println!("Environment: {}", assigned);

    Ok(())
}

async fn cmd_agent(
    settings: &Settings,
    locale: Option<String>,
    args: &ClassifierArgs,
) -> Result<()> {
    let gateway = build_gateway(args, settings.classifier_url.as_deref())?;
    let mut master = LocalMaster::from_settings(settings, gateway);
    if let Some(locale) = locale {
        master = master.with_locale(locale);
    }

    let report = AgentRunner::new(master)
        .run(&NodeId::new(settings.node.as_str()), &settings.environment)
        .await
        .context("Agent run failed")?;

    info!(run_id = %report.run_id, "agent run complete");
    for line in report.rendered(&EnglishLocalizer) {
        println!("{}", line);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
