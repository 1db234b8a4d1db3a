//! PHP script assembly for the appliance's `php-cgi` interpreter.
//!
//! A [`Script`] is a list of `require_once` includes plus a body of statement
//! lines. Rendering is pure and deterministic: the same includes and body
//! always produce byte-identical text.

use std::fmt;

/// Opening tag emitted before the include block.
pub const START_MARKER: &str = "<?php";
/// Closing tag emitted after the body.
pub const END_MARKER: &str = "?>";

/// Includes applied when a script is built without an explicit list.
///
/// Order matters: `config.inc` expects the globals and helper functions to be
/// loaded first.
pub const DEFAULT_INCLUDES: [&str; 4] = ["globals.inc", "functions.inc", "config.inc", "util.inc"];

/// A runnable unit of PHP: include directives followed by body lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    includes: Vec<String>,
    body: Vec<String>,
}

impl Script {
    /// Build a script from body fragments using [`DEFAULT_INCLUDES`].
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_includes(DEFAULT_INCLUDES, fragments)
    }

    /// Build a script with an explicit include list.
    ///
    /// The list is used as given, so an empty list renders no directives.
    /// Fragments may span several lines; a blank line is inserted before a
    /// fragment once the body already holds lines, never inside one.
    pub fn with_includes<N, M, I, S>(includes: N, fragments: I) -> Self
    where
        N: IntoIterator<Item = M>,
        M: Into<String>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut body: Vec<String> = Vec::new();
        for fragment in fragments {
            if !body.is_empty() {
                body.push(String::new());
            }
            body.extend(fragment.as_ref().lines().map(str::to_string));
        }
        Self {
            includes: includes.into_iter().map(Into::into).collect(),
            body,
        }
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }

    /// Render interpreter-ready source text.
    ///
    /// The include block and the body are concatenated verbatim, with no
    /// newline between the last directive and the first body line.
    pub fn render(&self) -> String {
        let includes_block = self
            .includes
            .iter()
            .map(|include| include_directive(include))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "{START_MARKER}\n{includes_block}{}\n{END_MARKER}",
            self.body.join("\n")
        )
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn include_directive(include: &str) -> String {
    format!("require_once(\"{include}\");")
}
