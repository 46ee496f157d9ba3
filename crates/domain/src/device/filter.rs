use std::collections::HashSet;

use regex::Regex;
use tracing::debug;

use super::DeviceConfig;
use crate::error::{DomainError, Result};

/// Result of narrowing a requested tag list.
///
/// `original` is an untouched copy of the request so responses can echo it
/// back; `filtered` is what actually goes to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredTags {
    pub original: Vec<String>,
    pub filtered: Vec<String>,
}

impl FilteredTags {
    /// Names that were requested but removed by the policy, in request order
    pub fn removed(&self) -> Vec<&str> {
        self.original
            .iter()
            .filter(|tag| !self.filtered.contains(tag))
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone)]
enum FilterMode {
    /// No policy configured
    Passthrough,
    /// `allow_tags` / `exclude_tags`; regex fields are ignored in this mode
    Explicit {
        allow: HashSet<String>,
        exclude: HashSet<String>,
    },
    /// `allow_tags_regex` / `exclude_tags_regex`, matched from the start of the name only
    Pattern {
        allow: Option<Regex>,
        exclude: Option<Regex>,
    },
}

/// Compiled allow/exclude policy of a device.
///
/// Explicit lists strictly override the regex fields. Regexes are anchored at
/// the start of the tag name but not at its end, so `TEMP` admits `TEMP_01`.
#[derive(Debug, Clone)]
pub struct TagFilter {
    device_id: String,
    mode: FilterMode,
}

impl TagFilter {
    /// Compile the policy of `config`. Fails with `DomainError::Config` on an invalid regex.
    pub fn from_config(config: &DeviceConfig) -> Result<Self> {
        let mode = if !config.allow_tags.is_empty() || !config.exclude_tags.is_empty() {
            FilterMode::Explicit {
                allow: config.allow_tags.iter().cloned().collect(),
                exclude: config.exclude_tags.iter().cloned().collect(),
            }
        } else if !config.allow_tags_regex.is_empty() || !config.exclude_tags_regex.is_empty() {
            FilterMode::Pattern {
                allow: compile_prefix_regex(&config.id, "allow_tags_regex", &config.allow_tags_regex)?,
                exclude: compile_prefix_regex(
                    &config.id,
                    "exclude_tags_regex",
                    &config.exclude_tags_regex,
                )?,
            }
        } else {
            FilterMode::Passthrough
        };

        Ok(Self {
            device_id: config.id.clone(),
            mode,
        })
    }

    /// Whether a single tag name survives the policy
    pub fn admits(&self, tag: &str) -> bool {
        match &self.mode {
            FilterMode::Passthrough => true,
            FilterMode::Explicit { allow, exclude } => {
                (allow.is_empty() || allow.contains(tag)) && !exclude.contains(tag)
            }
            FilterMode::Pattern { allow, exclude } => {
                allow.as_ref().is_none_or(|re| re.is_match(tag))
                    && !exclude.as_ref().is_some_and(|re| re.is_match(tag))
            }
        }
    }

    /// Narrow `tags` by the policy, preserving request order.
    pub fn apply(&self, tags: &[String]) -> FilteredTags {
        let filtered: Vec<String> = tags.iter().filter(|t| self.admits(t)).cloned().collect();

        debug!(
            device_id = %self.device_id,
            mode = self.mode_name(),
            original = ?tags,
            filtered = ?filtered,
            "Applied tag filter"
        );

        FilteredTags {
            original: tags.to_vec(),
            filtered,
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            FilterMode::Passthrough => "none",
            FilterMode::Explicit { .. } => "explicit",
            FilterMode::Pattern { .. } => "regex",
        }
    }
}

/// One-shot helper: compile the policy of `config` and apply it to `tags`.
pub fn filter_tags(tags: &[String], config: &DeviceConfig) -> Result<FilteredTags> {
    Ok(TagFilter::from_config(config)?.apply(tags))
}

fn compile_prefix_regex(device_id: &str, field: &str, pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }

    // Validate the pattern as written; wrapping it first could mask unbalanced groups.
    Regex::new(pattern).map_err(|e| {
        DomainError::Config(format!("Device '{device_id}': invalid {field} '{pattern}': {e}"))
    })?;

    Regex::new(&format!("^(?:{pattern})"))
        .map(Some)
        .map_err(|e| DomainError::Config(format!("Device '{device_id}': invalid {field}: {e}")))
}
