//! Splices a `permission:` block into an agent file's YAML frontmatter.
//!
//! Pure string manipulation: the frontmatter is located by its `---` fences
//! and only the `permission:` block is replaced; every other byte is kept.

use super::{PermValue, PermissionMap};
use regex::Regex;
use std::fmt::Write as _;
use std::sync::OnceLock;

const BOM: char = '\u{FEFF}';

/// Byte range of the frontmatter body: `start` is just past the opening
/// fence's newline, `end` is the offset of the closing `---`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frontmatter {
    pub start: usize,
    pub end: usize,
}

impl Frontmatter {
    pub fn body<'a>(&self, content: &'a str) -> &'a str {
        &content[self.start..self.end]
    }
}

/// Locate the frontmatter block.
///
/// The opening `---` must start the file (after an optional BOM) and be
/// followed by LF or CRLF. The closing `---` must begin a line and be followed
/// by a newline or the end of the file.
pub fn read_frontmatter_boundaries(content: &str) -> Option<Frontmatter> {
    let offset = if content.starts_with(BOM) {
        BOM.len_utf8()
    } else {
        0
    };
    if !content[offset..].starts_with("---") {
        return None;
    }
    let after = offset + 3;
    let tail = &content[after..];
    let start = if tail.starts_with("\r\n") {
        after + 2
    } else if tail.starts_with('\n') {
        after + 1
    } else {
        return None;
    };

    let bytes = content.as_bytes();
    let mut search = start;
    while let Some(rel) = content[search..].find("---") {
        let idx = search + rel;
        let at_line_start = idx > 0 && bytes[idx - 1] == b'\n';
        let rest = &content[idx + 3..];
        if at_line_start && (rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n")) {
            return Some(Frontmatter { start, end: idx });
        }
        search = idx + 3;
    }
    None
}

fn quote_key(key: &str) -> String {
    if key.contains('*') || key.contains(' ') {
        format!("\"{key}\"")
    } else {
        key.to_string()
    }
}

/// YAML text for a permission block, `permission:` header included.
pub fn build_permission_yaml(permissions: &PermissionMap) -> String {
    let mut out = String::from("permission:\n");
    for (name, value) in permissions {
        match value {
            PermValue::Flat(action) => {
                let _ = writeln!(out, "  {name}: {action}");
            }
            PermValue::Patterned(list) => {
                let _ = writeln!(out, "  {name}:");
                for (pattern, action) in list {
                    let _ = writeln!(out, "    {}: {action}", quote_key(pattern));
                }
            }
        }
    }
    out
}

fn permission_block_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?m)^permission:[ \t]*(?:\r?\n)(?:[ \t]+[^\n]*(?:\r?\n|$))*")
            .expect("permission block regex must compile")
    })
}

/// Replace the existing `permission:` block (the header line plus every
/// following indented line) or append one before the closing fence.
/// Content without frontmatter is returned unchanged.
pub fn splice_frontmatter(content: &str, permission_yaml: &str) -> String {
    let Some(bounds) = read_frontmatter_boundaries(content) else {
        return content.to_string();
    };
    let body = bounds.body(content);
    let new_body = match permission_block_regex().find(body) {
        Some(m) => format!("{}{}{}", &body[..m.start()], permission_yaml, &body[m.end()..]),
        None => {
            let sep = if !body.is_empty() && !body.ends_with('\n') {
                "\n"
            } else {
                ""
            };
            format!("{body}{sep}{permission_yaml}")
        }
    };
    format!(
        "{}{}{}",
        &content[..bounds.start],
        new_body,
        &content[bounds.end..]
    )
}

pub fn apply_permissions(content: &str, permissions: &PermissionMap) -> String {
    splice_frontmatter(content, &build_permission_yaml(permissions))
}
