// Path helper utilities shared by the facade and the adapters

/// Return a new String that guarantees a trailing '/'.
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Directory key as the backend expects it: trailing slashes trimmed, then exactly
/// one re-appended when the backend's folders carry one.
pub fn directory_key(path: &str, trailing_slash: bool) -> String {
    let trimmed = path.trim_end_matches('/');
    if trailing_slash {
        format!("{trimmed}/")
    } else {
        trimmed.to_string()
    }
}

/// Prefix under which a directory's children live. The root maps to `""`.
pub fn child_prefix(directory: &str) -> String {
    let trimmed = directory.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

/// Split a backend key into `(dirname, basename)`.
///
/// Trailing slashes are dropped first so directory keys like `sub/` split into
/// `("", "sub")`. Root-level keys get an empty dirname.
pub fn split_path(path: &str) -> (String, String) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((dirname, basename)) => (dirname.to_string(), basename.to_string()),
        None => (String::new(), trimmed.to_string()),
    }
}

/// Join a dirname and basename back into a key.
pub fn join_path(dirname: &str, basename: &str) -> String {
    if dirname.is_empty() {
        basename.to_string()
    } else {
        format!("{dirname}/{basename}")
    }
}

/// Path of the sibling named `new_name` at the same depth as `path`.
pub fn sibling_path(path: &str, new_name: &str) -> String {
    let mut parts: Vec<&str> = path.split('/').collect();
    parts.pop();
    parts.push(new_name);
    parts.join("/")
}

/// Replace the leading `old_prefix` of `key` with `new_prefix`.
///
/// Keys not anchored at `old_prefix` come back unchanged.
pub fn replace_prefix(key: &str, old_prefix: &str, new_prefix: &str) -> String {
    match key.strip_prefix(old_prefix) {
        Some(rest) => format!("{new_prefix}{rest}"),
        None => key.to_string(),
    }
}
