use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scently_client::{
    config::Config, GenderAffinity, RecommendationOrchestrator, RecommendationRecord, SelectionSet,
};

#[derive(Debug, Parser)]
#[command(
    name = "scently",
    about = "Perfume recommendations from the Scently service",
    after_help = "Examples:\n  scently name Dior Sauvage --ai\n  scently --sex female tags floral fresh floral"
)]
struct Cli {
    /// Gender affinity to remember for this and later requests
    #[arg(long, global = true)]
    sex: Option<GenderAffinity>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Perfumes similar to a known one
    Name {
        brand: String,
        name: String,
        /// Ask the AI advisor instead of the similarity matcher
        #[arg(long)]
        ai: bool,
    },
    /// Perfumes matching sensation tags; repeat a tag to weigh it more
    Tags {
        #[arg(required = true)]
        tags: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let orchestrator = RecommendationOrchestrator::from_config(&config)?;

    if let Some(sex) = cli.sex {
        orchestrator.preferences().set(sex)?;
    }

    let records = match cli.command {
        Command::Name { brand, name, ai } => {
            orchestrator
                .suggest_by_name(brand, name, ai.then_some(true))
                .await?
        }
        Command::Tags { tags } => {
            let selection: SelectionSet = tags.into_iter().collect();
            let chips: Vec<String> = selection
                .grouped_view()
                .iter()
                .map(|g| match g.count {
                    1 => g.tag.clone(),
                    n => format!("{} x{}", g.tag, n),
                })
                .collect();
            println!("Selected: {}", chips.join(", "));
            orchestrator.suggest_by_selection(&selection).await?
        }
    };

    if records.is_empty() {
        println!("No recommendations available");
    }
    for record in &records {
        print_record(record);
    }

    Ok(())
}

fn print_record(record: &RecommendationRecord) {
    let score = record
        .similarity_score
        .filter(|s| s.is_displayable())
        .map(|s| format!("  {}%", s.rounded_percent()))
        .unwrap_or_default();
    println!("{}. {}{}", record.rank, record.display_name(), score);

    let props = &record.properties;
    let mut summary = Vec::new();
    if let Some(kind) = &props.perfume_type {
        summary.push(kind.clone());
    }
    if let Some(sex) = &record.gender_affinity {
        summary.push(sex.clone());
    }
    if let Some(families) = props.family_groups() {
        summary.push(families.join(", "));
    }
    if !summary.is_empty() {
        println!("   {}", summary.join(" | "));
    }

    for (label, notes) in [
        ("top", &props.upper_notes),
        ("heart", &props.core_notes),
        ("base", &props.base_notes),
    ] {
        if !notes.is_empty() {
            println!("   {}: {}", label, notes.join(", "));
        }
    }

    for shop in &record.shops {
        let variants: Vec<String> = shop
            .variants
            .iter()
            .map(|v| match v.price {
                Some(price) => format!("{} ml {}", v.volume, price),
                None => format!("{} ml", v.volume),
            })
            .collect();
        println!("   {}: {}", shop.shop_name, variants.join(", "));
    }
}
