use std::path::Path;

use anyhow::Context;
use tracing::warn;

use heatgrid_core::{ClusteredHeatmap, HeatgridConfig};
use heatgrid_render::{OutputFormat, RenderOptions, render_csv, render_json, render_svg};

use super::build_pipeline;

pub async fn heatmap(
    config: &HeatgridConfig,
    fixture: Option<&Path>,
    output: Option<&Path>,
    format: Option<OutputFormat>,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config, fixture)?;
    let heatmap = pipeline.run(&config.params()).await?;

    if !heatmap.failed_contexts.is_empty() {
        warn!(
            skipped = heatmap.failed_contexts.len(),
            contexts = ?heatmap.failed_contexts,
            "some contexts could not be fetched"
        );
    }

    let format = format
        .or_else(|| output.and_then(format_from_extension))
        .unwrap_or_default();
    let options = RenderOptions {
        fig_w: config.render.fig_w,
        fig_h: config.render.fig_h,
    };
    options.check().map_err(anyhow::Error::msg)?;
    let body = render(&heatmap, format, options)?;

    match output {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "✓ Wrote {} ({} metrics, {} clusters)",
                path.display(),
                heatmap.rows.len(),
                heatmap.n_clusters
            );
        }
        None => print!("{body}"),
    }

    Ok(())
}

fn format_from_extension(path: &Path) -> Option<OutputFormat> {
    path.extension()?.to_str()?.parse().ok()
}

fn render(
    heatmap: &ClusteredHeatmap,
    format: OutputFormat,
    options: RenderOptions,
) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Svg => render_svg(heatmap, options),
        OutputFormat::Csv => render_csv(heatmap),
        OutputFormat::Json => render_json(heatmap)?,
    })
}
