use std::collections::HashMap;
use std::sync::OnceLock;

use domain::DomainError;
use regex::Regex;

static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
static UNDERSCORE_RUNS: OnceLock<Regex> = OnceLock::new();

/// Turn an arbitrary device ID into a name that is safe on common filesystems.
///
/// Reserved characters, commas, whitespace and control characters become `_`,
/// runs of `_` collapse to one, and leading/trailing dots are stripped.
/// Distinct IDs may map to the same name; see [`ensure_distinct_cache_files`].
pub fn sanitize_filename(name: &str) -> String {
    let unsafe_chars = UNSAFE_CHARS.get_or_init(|| {
        Regex::new(r#"[<>:"/\\|?*,\s\x00-\x1f\x7f]"#).expect("Invalid regex")
    });
    let underscore_runs = UNDERSCORE_RUNS.get_or_init(|| Regex::new(r"_+").expect("Invalid regex"));

    let replaced = unsafe_chars.replace_all(name.trim(), "_");
    let collapsed = underscore_runs.replace_all(&replaced, "_");
    let stripped = collapsed.trim_matches('.');

    if stripped.is_empty() {
        "_".to_string()
    } else {
        stripped.to_string()
    }
}

/// File name of the cache record for `device_id`
pub fn cache_file_name(device_id: &str) -> String {
    format!("{}.json", sanitize_filename(device_id))
}

/// Fail when two device IDs would share one cache file
pub fn ensure_distinct_cache_files<'a>(
    device_ids: impl IntoIterator<Item = &'a str>,
) -> Result<(), DomainError> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    for id in device_ids {
        let file_name = cache_file_name(id);
        if let Some(owner) = owners.get(&file_name) {
            if *owner != id {
                return Err(DomainError::Config(format!(
                    "Devices '{}' and '{}' map to the same cache file {}",
                    owner, id, file_name
                )));
            }
        }
        owners.insert(file_name, id);
    }
    Ok(())
}
