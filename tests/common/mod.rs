#![allow(dead_code)]

use std::path::{Path, PathBuf};

#[path = "../../src/testing.rs"]
mod testing;

use testing::{FixtureSymbol, write_index};

/// (name, type, stored path, anchor)
pub type Entry<'a> = (&'a str, &'a str, &'a str, Option<&'a str>);

pub const VECTOR_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>std::vector - cppreference.com</title>
<script>var wgPageName = "cpp/container/vector";</script></head>
<body>
<div class="leftnav"><a href="/w/">Main Page</a> <a href="/w/cpp">C++</a></div>
<div id="content">
  <h1 class="firstHeading">std::vector</h1>
  <div class="noprint">Print version of this page</div>
  <p><code>std::vector</code> is a sequence container that encapsulates
     dynamic size arrays, stored contiguously, with automatic growth.</p>
  <h3>Member functions</h3>
  <table>
    <tr><th>Name</th><th>Description</th></tr>
    <tr><td><a href="vector/push_back.html">push_back</a></td>
        <td>adds an element to the end</td></tr>
  </table>
  <pre>std::vector&lt;int&gt; v = {1, 2, 3};
v.push_back(4);</pre>
</div>
<div id="footer"><p>Retrieved from the archive, licensed under free terms.</p></div>
</body></html>"#;

/// Build `<data>/docsets/<name>/<name>.docset/Contents/Resources` with a
/// symbol index holding `entries` and the given pages under `Documents/`.
pub fn install_docset(
    data: &Path,
    name: &str,
    entries: &[Entry<'_>],
    pages: &[(&str, &str)],
) -> PathBuf {
    let root = data
        .join("docsets")
        .join(name)
        .join(format!("{name}.docset"))
        .join("Contents/Resources");
    std::fs::create_dir_all(&root).unwrap();

    let symbols: Vec<FixtureSymbol> = entries
        .iter()
        .map(|(name, symbol_type, path, anchor)| {
            let symbol = FixtureSymbol::new(name, symbol_type, path);
            match anchor {
                Some(anchor) => symbol.anchor(anchor),
                None => symbol,
            }
        })
        .collect();
    write_index(&root.join("docSet.dsidx"), &symbols);

    for (relative, html) in pages {
        let file = root.join("Documents").join(relative);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(file, html).unwrap();
    }

    root
}

/// A small C++ docset: three vector symbols sharing one page, and printf.
pub fn install_cpp(data: &Path) -> PathBuf {
    install_docset(
        data,
        "C++",
        &[
            (
                "std::vector::push_back",
                "Method",
                "cpp>en.cppreference.com%2Fw%2Fcpp%2Fcontainer%2Fvector.html",
                Some("push_back"),
            ),
            (
                "std::vector",
                "Class",
                "cpp>en.cppreference.com%2Fw%2Fcpp%2Fcontainer%2Fvector.html",
                None,
            ),
            (
                "printf",
                "Function",
                "cpp>en.cppreference.com%2Fw%2Fc%2Fio%2Fprintf.html",
                None,
            ),
        ],
        &[(
            "en.cppreference.com/w/cpp/container/vector.html",
            VECTOR_PAGE,
        )],
    )
}
