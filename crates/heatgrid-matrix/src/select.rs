//! Context selection by regular expression.

use regex::Regex;

use heatgrid_core::{PipelineError, PipelineResult};

/// A compiled context pattern.
///
/// Matching is anchored at the start of the context but not at the end,
/// so `system` selects `system.cpu` and `system.ram`, while `cpu` does not
/// select `system.cpu`.
#[derive(Debug, Clone)]
pub struct ContextFilter {
    pattern: String,
    regex: Regex,
}

impl ContextFilter {
    pub fn new(pattern: &str) -> PipelineResult<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})")).map_err(|e| {
            PipelineError::InvalidParameter(format!("invalid contexts_regex {pattern:?}: {e}"))
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, context: &str) -> bool {
        self.regex.is_match(context)
    }
}

/// Select the contexts matching `pattern`, sorted and de-duplicated.
///
/// An empty pattern selects everything; no match is an empty result, not
/// an error.
pub fn select_contexts<'a, I>(contexts: I, pattern: &str) -> PipelineResult<Vec<String>>
where
    I: IntoIterator<Item = &'a String>,
{
    let filter = ContextFilter::new(pattern)?;
    let mut matched: Vec<String> = contexts
        .into_iter()
        .filter(|c| filter.matches(c))
        .cloned()
        .collect();
    matched.sort();
    matched.dedup();
    Ok(matched)
}
