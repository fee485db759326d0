/// URL template resolution and request validation.
use std::path::{Component, Path};

use reqwest::Url;
use sm_scaffold_shared::errors::{FetchError, FetchResult};
use sm_scaffold_shared::models::ScaffoldRequest;

pub const VERSION_PLACEHOLDER: &str = "{version}";
pub const PATH_PLACEHOLDER: &str = "{path}";

// How the placeholders read once the template has been parsed as a URL.
const VERSION_SEGMENT: &str = "%7Bversion%7D";
const PATH_SEGMENT: &str = "%7Bpath%7D";

/// Check that `template` contains each placeholder exactly once, each as a
/// whole path segment of an http(s) URL.
pub fn validate_template(template: &str) -> FetchResult<()> {
    parse_template(template).map(|_| ())
}

fn parse_template(template: &str) -> FetchResult<(Url, Vec<String>)> {
    for placeholder in [VERSION_PLACEHOLDER, PATH_PLACEHOLDER] {
        let count = template.matches(placeholder).count();
        if count != 1 {
            return Err(FetchError::Config(format!(
                "URL template must contain {} exactly once, found {} in {:?}",
                placeholder, count, template
            )));
        }
    }

    let url = Url::parse(template)
        .map_err(|e| FetchError::Config(format!("Invalid URL template {:?}: {}", template, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::Config(format!(
            "Unsupported URL scheme {:?} in {:?}",
            url.scheme(),
            template
        )));
    }

    let segments: Vec<String> = url
        .path_segments()
        .map(|s| s.map(String::from).collect())
        .unwrap_or_default();
    for placeholder in [VERSION_SEGMENT, PATH_SEGMENT] {
        if !segments.iter().any(|s| s == placeholder) {
            return Err(FetchError::Config(format!(
                "URL template {:?}: placeholders must each fill a whole path segment",
                template
            )));
        }
    }
    Ok((url, segments))
}

/// Substitute `version` and `path` into `template`.
///
/// Both values are split on `/` and every piece is percent-encoded as a
/// single path segment, so `?`, `#` and `%` never leave the path. Empty,
/// `.` and `..` pieces are dropped.
pub fn resolve_url(template: &str, version: &str, path: &str) -> FetchResult<Url> {
    let (mut url, template_segments) = parse_template(template)?;
    let resolved = template_segments
        .iter()
        .map(|segment| match segment.as_str() {
            VERSION_SEGMENT => encode_segments(version),
            PATH_SEGMENT => encode_segments(path),
            literal => Ok(literal.to_string()),
        })
        .collect::<FetchResult<Vec<_>>>()?;
    url.set_path(&format!("/{}", resolved.join("/")));
    Ok(url)
}

/// Percent-encode each `/`-separated piece of `value` as a path segment.
fn encode_segments(value: &str) -> FetchResult<String> {
    let no_base = || FetchError::Config("Cannot encode URL path segments".into());
    let mut scratch = Url::parse("http://segments.invalid/").map_err(|_| no_base())?;
    scratch
        .path_segments_mut()
        .map_err(|_| no_base())?
        .clear()
        .extend(
            value
                .split('/')
                .filter(|s| !matches!(*s, "" | "." | "..")),
        );
    Ok(scratch.path().trim_start_matches('/').to_string())
}

/// A scaffold path must stay inside the destination directory.
pub fn validate_file_path(path: &str) -> FetchResult<()> {
    if path.trim().is_empty() {
        return Err(FetchError::Config("Empty path in file list".into()));
    }
    let escapes = Path::new(path)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(FetchError::Config(format!(
            "File path {:?} must be relative and stay inside the destination",
            path
        )));
    }
    Ok(())
}

/// A version names a branch or tag; it may contain `/` but no dot segments.
pub fn validate_version(version: &str) -> FetchResult<()> {
    if version.trim().is_empty() {
        return Err(FetchError::Config("Version must not be empty".into()));
    }
    if version.split('/').any(|s| s == "." || s == "..") {
        return Err(FetchError::Config(format!(
            "Version {:?} must not contain . or .. segments",
            version
        )));
    }
    Ok(())
}

/// Reject a request before any filesystem or network activity.
pub fn validate_request(request: &ScaffoldRequest) -> FetchResult<()> {
    validate_template(&request.url_template)?;
    validate_version(&request.version)?;
    if request.file_list.is_empty() {
        return Err(FetchError::Config("File list must not be empty".into()));
    }
    for path in &request.file_list {
        validate_file_path(path)?;
    }
    if !request.destination_dir.is_absolute() {
        return Err(FetchError::Config(format!(
            "Destination directory {:?} must be an absolute path",
            request.destination_dir
        )));
    }
    Ok(())
}
