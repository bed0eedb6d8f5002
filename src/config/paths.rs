use std::path::{Path, PathBuf};

/// Expands `$VAR`, `${VAR}` and `%VAR%` references using `lookup`.
///
/// References to unknown variables are left exactly as written.
pub fn expand_vars_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(|c: char| c == '$' || c == '%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let consumed = match reference(tail) {
            Some((name, len)) => {
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&tail[..len]),
                }
                len
            }
            None => {
                out.push_str(&tail[..1]);
                1
            }
        };
        rest = &tail[consumed..];
    }

    out.push_str(rest);
    out
}

pub fn expand_vars(input: &str) -> String {
    expand_vars_with(input, |name| std::env::var(name).ok())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parses a variable reference at the start of `s`: returns the name and the
/// number of bytes the whole reference occupies.
fn reference(s: &str) -> Option<(&str, usize)> {
    if let Some(body) = s.strip_prefix("${") {
        let end = body.find('}')?;
        let name = &body[..end];
        return valid_name(name).then(|| (name, end + 3));
    }
    if let Some(body) = s.strip_prefix('$') {
        let end = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
        let name = &body[..end];
        return valid_name(name).then(|| (name, end + 1));
    }
    if let Some(body) = s.strip_prefix('%') {
        let end = body.find('%')?;
        let name = &body[..end];
        return valid_name(name).then(|| (name, end + 2));
    }
    None
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

/// Output file name for `input`: `<stem> output<.ext>`.
pub fn output_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match input.extension() {
        Some(ext) => format!("{} output.{}", stem, ext.to_string_lossy()),
        None => format!("{} output", stem),
    }
}

/// Resolves one output path per configured directory.
///
/// An empty directory entry means the directory of the input file.
pub fn output_paths(input: &Path, directories: &[String]) -> Vec<PathBuf> {
    let file_name = output_file_name(input);
    let input_dir = input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    directories
        .iter()
        .map(|dir| {
            let expanded = expand_vars(dir.trim());
            let base = if expanded.is_empty() {
                input_dir.clone()
            } else {
                PathBuf::from(expanded)
            };
            base.join(&file_name)
        })
        .collect()
}
