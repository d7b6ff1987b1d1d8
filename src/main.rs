use std::env;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kondate::config::{PlannerConfig, ProviderSettings};
use kondate::formatting::{format_shopping_list, format_suggestion, format_week};
use kondate::planner::Planner;
use kondate::provider::{ChatCompletionsProvider, FallbackProvider, RecipeProvider};
use kondate::shopping::shopping_list_for_days;

const USAGE: &str = "usage: kondate [day|week] [config.json]";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("KONDATE_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // `init` also installs the log bridge, so `log` records reach the subscriber
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn select_provider(config: &PlannerConfig) -> Box<dyn RecipeProvider> {
    match ChatCompletionsProvider::new(ProviderSettings::from_env(&config.features)) {
        Ok(provider) => Box::new(provider),
        Err(err) => {
            warn!(error = %err, "Generation provider unavailable, using static recipes");
            Box::new(FallbackProvider)
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let mode = args.first().map(String::as_str).unwrap_or("day");
    let config = match args.get(1) {
        Some(path) => PlannerConfig::from_json_file(path)?,
        None => PlannerConfig::from_env().context("Failed to load configuration from environment")?,
    };

    let provider = select_provider(&config);
    info!(provider = provider.name(), mode, "Starting kondate");
    let planner = Planner::new(provider, config);

    match mode {
        "day" => {
            let suggestion = planner.suggest_day()?;
            let config = planner.config();
            println!("{}", format_suggestion(&suggestion, config.profile, config.child_mode));
        }
        "week" => {
            let plan = planner.plan_week()?;
            println!("{}", format_week(&plan, planner.config().child_mode));
            println!();
            println!("{}", format_shopping_list(&shopping_list_for_days(&plan.days)));
        }
        other => bail!("unknown mode '{}'\n{}", other, USAGE),
    }

    Ok(())
}
