use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::error::{Error, Result};

/// Where a stored page path points: on disk and on the web.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub file_path: PathBuf,
    pub url: String,
}

/// Maps stored page paths to local files and source URLs.
///
/// Docset generators store paths as `<prefix>>host%2Fpath%2Fpage.html`:
/// the text after the last `>` is the percent-encoded original web path.
/// The same decoded string feeds both the file path and the URL so the
/// two can never disagree.
#[derive(Debug, Clone)]
pub struct PathResolver {
    documents_dir: PathBuf,
}

impl PathResolver {
    pub fn new(documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
        }
    }

    pub fn documents_dir(&self) -> &Path {
        &self.documents_dir
    }

    /// Resolve a stored path. The file path always stays under the
    /// documents directory: leading `/` is ignored and `..` is rejected.
    pub fn resolve(&self, stored: &str) -> Result<ResolvedPath> {
        let decoded = decode_stored_path(stored)?;

        let mut file_path = self.documents_dir.clone();
        for component in Path::new(&decoded).components() {
            match component {
                Component::Normal(part) => file_path.push(part),
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(Error::Decode {
                        path: stored.to_string(),
                        reason: "path leaves the documents directory".into(),
                    });
                }
            }
        }

        Ok(ResolvedPath {
            file_path,
            url: format!("https://{decoded}"),
        })
    }
}

/// Strip the synthetic prefix and percent-decode the remainder.
pub fn decode_stored_path(stored: &str) -> Result<String> {
    let suffix = stored.rsplit_once('>').map_or(stored, |(_, rest)| rest);
    percent_decode_str(suffix)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| Error::Decode {
            path: stored.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("/data/C++.docset/Contents/Resources/Documents")
    }

    #[test]
    fn resolve_prefixed_path() {
        let resolved = resolver()
            .resolve("prefix>en.example.com%2Fa%2Fb.html")
            .unwrap();

        assert!(
            resolved
                .file_path
                .ends_with("Documents/en.example.com/a/b.html")
        );
        assert_eq!(resolved.url, "https://en.example.com/a/b.html");
    }

    #[test]
    fn resolve_without_prefix() {
        let bare = resolver().resolve("en.example.com%2Fa.html").unwrap();
        let prefixed =
            resolver().resolve("prefix>en.example.com%2Fa.html").unwrap();

        assert_eq!(bare, prefixed);
        assert_eq!(bare.url, "https://en.example.com/a.html");
    }

    #[test]
    fn only_last_separator_counts() {
        let resolved = resolver()
            .resolve("<dash_entry_name=x>y>en.example.com%2Fz.html")
            .unwrap();
        assert_eq!(resolved.url, "https://en.example.com/z.html");
    }

    #[test]
    fn decodes_escaped_characters() {
        let resolved = resolver()
            .resolve("p>en.cppreference.com%2Fw%2Fcpp%2Foperator%3C%3C.html")
            .unwrap();
        assert_eq!(
            resolved.url,
            "https://en.cppreference.com/w/cpp/operator<<.html"
        );
        assert!(resolved.file_path.ends_with("w/cpp/operator<<.html"));
    }

    #[test]
    fn invalid_utf8_is_decode_error() {
        let err = resolver().resolve("p>bad%FF%FE.html").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn empty_suffix_points_at_documents_dir() {
        let resolved = resolver().resolve("prefix>").unwrap();
        assert_eq!(resolved.url, "https://");
        assert_eq!(resolved.file_path, resolver().documents_dir());
    }

    #[test]
    fn absolute_path_stays_under_documents() {
        let resolved = resolver().resolve("p>%2Fetc%2Fpasswd").unwrap();
        assert_eq!(
            resolved.file_path,
            resolver().documents_dir().join("etc/passwd")
        );
    }

    #[test]
    fn parent_components_are_decode_errors() {
        for stored in ["p>..%2F..%2Fsecret", "p>a%2F..%2F..%2Fb", "p>.."] {
            let err = resolver().resolve(stored).unwrap_err();
            assert!(matches!(err, Error::Decode { .. }), "{stored}");
        }
    }

    #[test]
    fn dot_segments_inside_names_are_kept() {
        let resolved = resolver().resolve("p>x.org%2Fa..b%2F.c.html").unwrap();
        assert!(resolved.file_path.ends_with("x.org/a..b/.c.html"));
    }

    proptest! {
        #[test]
        fn resolved_file_stays_under_documents(stored in "[a-z>%0-9A-F./]{0,40}") {
            let r = resolver();
            if let Ok(resolved) = r.resolve(&stored) {
                prop_assert!(resolved.file_path.starts_with(r.documents_dir()));
            }
        }

        #[test]
        fn resolve_is_deterministic(stored in "[a-z>%0-9A-F./]{0,40}") {
            let r = resolver();
            let first = r.resolve(&stored).ok();
            let second = r.resolve(&stored).ok();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prefix_never_changes_result(
            prefix in "[a-z_=<]{0,12}",
            suffix in "[a-z0-9][a-z0-9.]{0,9}(%2F[a-z0-9][a-z0-9.]{0,9}){0,3}",
        ) {
            let r = resolver();
            let with_prefix = r.resolve(&format!("{prefix}>{suffix}")).unwrap();
            let without = r.resolve(&suffix).unwrap();
            prop_assert_eq!(&with_prefix, &without);
            prop_assert!(with_prefix.url.starts_with("https://"));
            let decoded = suffix.replace("%2F", "/");
            prop_assert_eq!(with_prefix.url, format!("https://{decoded}"));
        }
    }
}
