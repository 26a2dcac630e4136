//! Command execution.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use triage_core::{
    lookup_or_default, BuiltinResources, CountryResource, Engine, InstrumentId, ResourceDirectory,
    ResourceLookup, RoutingDecision, ScoreResponse,
};
use triage_runtime::{IntakeFlowBuilder, RuntimeConfig};

/// Parse a comma-separated score list. Empty input is an empty list.
pub fn parse_scores(input: &str) -> Result<Vec<i64>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<i64>()
                .with_context(|| format!("Invalid item score '{}'", item))
        })
        .collect()
}

fn resource_source(dir: Option<&Path>) -> Box<dyn ResourceLookup> {
    match dir {
        Some(dir) => Box::new(ResourceDirectory::new(dir)),
        None => Box::new(BuiltinResources),
    }
}

fn load_resource(country: &str, dir: Option<&Path>) -> CountryResource {
    lookup_or_default(resource_source(dir).as_ref(), country)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn detect(engine: &Engine, text: &str, json: bool) -> Result<()> {
    let found = engine.crisis_match(text);

    if json {
        print_json(&serde_json::json!({
            "crisis": found.is_some(),
            "match": found,
        }))
    } else {
        println!("{}", if found.is_some() { "crisis" } else { "clear" });
        Ok(())
    }
}

/// Check every item against the configured instrument before routing.
fn check_items(engine: &Engine, id: InstrumentId, scores: &[i64]) -> Result<()> {
    for (index, score) in scores.iter().enumerate() {
        let response = ScoreResponse::new(id.as_str(), index, *score);
        engine
            .validate_answer(&response)
            .with_context(|| format!("{} item {}", id, index + 1))?;
    }
    Ok(())
}

pub fn route(engine: &Engine, phq9: &str, gad7: &str, age_band: &str, json: bool) -> Result<()> {
    let phq9 = parse_scores(phq9).context("Failed to parse --phq9")?;
    let gad7 = parse_scores(gad7).context("Failed to parse --gad7")?;

    check_items(engine, InstrumentId::Phq9, &phq9)?;
    check_items(engine, InstrumentId::Gad7, &gad7)?;

    let decision = engine.score_and_route(&phq9, &gad7, age_band);

    if json {
        print_json(&decision)
    } else {
        print_decision(&decision);
        Ok(())
    }
}

fn print_decision(decision: &RoutingDecision) {
    println!("Bucket:         {}", decision.bucket);
    println!("Recommendation: {}", decision.recommendation);
    println!(
        "Scores:         PHQ-9 {} / GAD-7 {}",
        decision.scores.phq9, decision.scores.gad7
    );
    println!("Decided by:     {}", decision.explanation.decision.basis);

    for (label, evaluation) in [
        ("PHQ-9", &decision.explanation.phq9),
        ("GAD-7", &decision.explanation.gad7),
    ] {
        let met: Vec<String> = evaluation
            .comparisons
            .iter()
            .map(|c| format!("{}>={}:{}", c.threshold, c.cutoff, if c.met { "yes" } else { "no" }))
            .collect();
        println!("  {} {} [{}]", label, evaluation.score, met.join(" "));
    }
}

pub fn crisis_response(
    engine: &Engine,
    country: &str,
    dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let resource = load_resource(country, dir);
    let message = engine.format_crisis_response(&resource);

    if json {
        print_json(&serde_json::json!({ "country": country, "message": message }))
    } else {
        println!("{}", message);
        Ok(())
    }
}

pub fn questions(engine: &Engine, instrument: &str, json: bool) -> Result<()> {
    let prompts = engine.questions(instrument)?;

    if json {
        return print_json(&prompts);
    }

    for (index, prompt) in prompts.iter().enumerate() {
        println!("{:>2}. {}", index + 1, prompt);
    }
    Ok(())
}

pub fn resources(country: &str, dir: Option<&Path>) -> Result<()> {
    print_json(&load_resource(country, dir))
}

pub async fn intake(
    engine: Engine,
    text: &str,
    country: Option<&str>,
    dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut config = RuntimeConfig::from_env();
    if let Some(dir) = dir {
        config.resources_dir = Some(dir.to_path_buf());
    }

    let flow = IntakeFlowBuilder::new()
        .engine(Arc::new(engine))
        .config(config)
        .build()
        .context("Failed to build intake flow")?;

    let outcome = flow.handle_message(text, country).await;

    if json {
        return print_json(&serde_json::json!({
            "reply": outcome.reply,
            "crisis": outcome.crisis,
            "audit": outcome.audit,
        }));
    }

    println!("{}", outcome.reply.user_message);
    Ok(())
}
