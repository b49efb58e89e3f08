//! Pure helpers for forward-slash storage paths.
//!
//! None of these functions touch a backend: they are total over every input
//! string and never fail.

use uuid::Uuid;

/// A value that can be flattened into path segments.
///
/// Implemented for string types and (nested) sequences of them, so
/// `join(&["a", "b/c"])` and `join(&vec![vec!["a"], vec!["b"]])` both work.
pub trait PathSegments {
    fn collect_segments<'a>(&'a self, out: &mut Vec<&'a str>);
}

impl PathSegments for str {
    fn collect_segments<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self);
    }
}

impl PathSegments for String {
    fn collect_segments<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self.as_str());
    }
}

impl<T: PathSegments + ?Sized> PathSegments for &T {
    fn collect_segments<'a>(&'a self, out: &mut Vec<&'a str>) {
        (**self).collect_segments(out);
    }
}

impl<T: PathSegments> PathSegments for [T] {
    fn collect_segments<'a>(&'a self, out: &mut Vec<&'a str>) {
        for part in self {
            part.collect_segments(out);
        }
    }
}

impl<T: PathSegments, const N: usize> PathSegments for [T; N] {
    fn collect_segments<'a>(&'a self, out: &mut Vec<&'a str>) {
        self.as_slice().collect_segments(out);
    }
}

impl<T: PathSegments> PathSegments for Vec<T> {
    fn collect_segments<'a>(&'a self, out: &mut Vec<&'a str>) {
        self.as_slice().collect_segments(out);
    }
}

impl<T: PathSegments> PathSegments for Option<T> {
    fn collect_segments<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(part) = self {
            part.collect_segments(out);
        }
    }
}

/// Flattens `parts`, drops empty parts and joins the rest with `/`, then normalizes.
pub fn join<P: PathSegments + ?Sized>(parts: &P) -> String {
    let mut segments = Vec::new();
    parts.collect_segments(&mut segments);

    let joined = segments
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    normalize(&joined)
}

/// Collapses repeated separators, removes `.` and `..` segments and strips any
/// leading or trailing separators.
///
/// `normalize(&normalize(p)) == normalize(p)` for every `p`. The result has no dot
/// segments, so URL parsers that resolve them leave it unchanged.
pub fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .collect();

    segments.join("/")
}

/// Normalizes `path` and anchors it at the filesystem root (`/a/b`).
pub fn normalize_absolute(path: &str) -> String {
    format!("/{}", normalize(path))
}

/// Directory part of `path`; `""` when there is none (never `.`).
pub fn directory(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Last segment of `path`.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Last segment of `path` without its extension.
pub fn filename(path: &str) -> &str {
    let name = basename(path);
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Lowercased suffix after the last `.` of the last segment, or `""`.
pub fn extension(path: &str) -> String {
    let name = basename(path);
    match name.rfind('.') {
        Some(idx) => name[idx + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Turns a file name into a lowercase ASCII slug, keeping the extension.
///
/// `"Quarterly Report (v2).PDF"` becomes `"quarterly_report_v2.pdf"`.
pub fn slug_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in filename(name).chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        slug.push('_');
    }

    let extension = extension(name);
    if extension.is_empty() {
        slug
    } else {
        format!("{}.{}", slug, extension)
    }
}

/// Time-ordered unique file name with the given extension (`tmp` when absent).
pub fn temp_name(extension: Option<&str>) -> String {
    let extension = extension.filter(|ext| !ext.is_empty()).unwrap_or("tmp");
    format!("{}.{}", Uuid::now_v7(), extension)
}

/// True for `http://` and `https://` strings.
pub fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_flattens_and_collapses() {
        assert_eq!(join("a//b/./c"), "a/b/c");
        assert_eq!(join(&["a", "", "b/c"]), "a/b/c");
        assert_eq!(join(&vec![vec!["reports"], vec!["2024", "q1.csv"]]), "reports/2024/q1.csv");
        assert_eq!(join(&[Some("a"), None, Some("b")]), "a/b");
        assert_eq!(join("./a/b"), "a/b");
        assert_eq!(join("/a/b/"), "a/b");
        assert_eq!(join(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "/",
            ".",
            "./",
            "/./x",
            ".//x",
            "a//b/./c",
            "../../etc/passwd",
            "a/../b",
            "///deep////nested///file.txt///",
            "./././x/./y",
            "name with spaces/ü.txt",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
            assert!(
                !once.split('/').any(|s| s == ".." || s == "."),
                "dot segment kept in {:?}",
                once
            );
            assert!(!once.starts_with('/'));
        }
    }

    #[test]
    fn test_normalize_absolute() {
        assert_eq!(normalize_absolute("tmp//diskfile/x"), "/tmp/diskfile/x");
        assert_eq!(normalize_absolute("/tmp/x"), "/tmp/x");
        assert_eq!(normalize_absolute(&normalize_absolute("/tmp/x")), "/tmp/x");
    }

    #[test]
    fn test_directory() {
        assert_eq!(directory("file.txt"), "");
        assert_eq!(directory("a/b/file.txt"), "a/b");
        assert_eq!(directory("/tmp"), "/");
        assert_eq!(directory(""), "");
    }

    #[test]
    fn test_name_parts() {
        assert_eq!(basename("a/b/q1.CSV"), "q1.CSV");
        assert_eq!(filename("a/b/q1.CSV"), "q1");
        assert_eq!(extension("a/b/q1.CSV"), "csv");
        assert_eq!(extension("a.d/readme"), "");
        assert_eq!(extension("archive.tar.gz"), "gz");
    }

    #[test]
    fn test_slug_name() {
        assert_eq!(slug_name("Quarterly Report (v2).PDF"), "quarterly_report_v2.pdf");
        assert_eq!(slug_name("!!!.txt"), "_.txt");
        assert_eq!(slug_name("plain"), "plain");
    }

    #[test]
    fn test_temp_name() {
        let first = temp_name(Some("png"));
        let second = temp_name(None);
        assert!(first.ends_with(".png"));
        assert!(second.ends_with(".tmp"));
        assert_ne!(first, temp_name(Some("png")));
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/a.png"));
        assert!(is_url("http://example.com"));
        assert!(!is_url("/var/tmp/a.png"));
        assert!(!is_url("ftp://example.com"));
    }
}
