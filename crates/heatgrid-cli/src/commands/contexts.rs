use std::path::Path;

use heatgrid_core::HeatgridConfig;

use super::build_pipeline;

pub async fn contexts(config: &HeatgridConfig, fixture: Option<&Path>) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config, fixture)?;
    let matched = pipeline.matched_contexts(&config.params()).await?;

    for context in &matched {
        println!("{context}");
    }
    if matched.is_empty() {
        eprintln!("no contexts match {:?}", config.query.contexts_regex);
    }

    Ok(())
}
