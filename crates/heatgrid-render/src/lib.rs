//! heatgrid-render — turning a `ClusteredHeatmap` into something to look at.
//!
//! | Output | Function |
//! |---|---|
//! | SVG heatmap, `Greens` colour scale | `render_svg()` |
//! | CSV, one line per metric | `render_csv()` |
//! | JSON, the full result | `render_json()` |

pub mod colorscale;
pub mod export;
pub mod svg;

pub use colorscale::ColorScale;
pub use export::{render_csv, render_json};
pub use svg::{MAX_FIG_H, MAX_FIG_W, RenderOptions, render_svg};

use std::fmt;
use std::str::FromStr;

/// Output format selectable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Svg,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other} (expected svg, csv or json)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_formats() {
        assert_eq!("svg".parse::<OutputFormat>(), Ok(OutputFormat::Svg));
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("png".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn display_is_extension() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
