//! Minimal selector matching for theme metadata (`evt`, file selectors).
//!
//! Supported: compound simple selectors built from `tag` (or `*`), `.class`,
//! `#id`, `[attr]` and `[attr=value]` (value optionally quoted), chained by
//! the descendant combinator (whitespace), plus comma separated groups. Child
//! and sibling combinators are rejected.
//!
//! As with the browser's `querySelectorAll`, ancestors named by a descendant
//! chain may lie outside the node the query starts from.

use thiserror::Error;

use super::node::Node;

/// Selector failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector `{selector}`: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if !node.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.id().as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| node.has_class(class)) {
            return false;
        }
        self.attrs.iter().all(|(name, expected)| match (node.attr(name), expected) {
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == *expected,
            (None, _) => false,
        })
    }
}

/// Compounds joined by descendant combinators, outermost first.
#[derive(Debug, Clone, PartialEq)]
struct Complex {
    compounds: Vec<Compound>,
}

impl Complex {
    fn matches(&self, node: &Node) -> bool {
        let Some((subject, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !subject.matches(node) {
            return false;
        }

        // Greedy nearest-ancestor match is exact when every combinator is a descendant one
        let mut pending = ancestors.iter().rev().peekable();
        let mut current = node.parent();
        while let (Some(compound), Some(ancestor)) = (pending.peek(), current) {
            if compound.matches(&ancestor) {
                pending.next();
            }
            current = ancestor.parent();
        }
        pending.peek().is_none()
    }
}

/// A parsed selector group.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    groups: Vec<Complex>,
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let fail = |reason| SelectorError {
            selector: source.to_string(),
            reason,
        };

        let mut groups = Vec::new();
        for part in source.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(fail("empty selector"));
            }
            let compounds = split_compounds(part)
                .iter()
                .map(|token| parse_compound(token))
                .collect::<Result<Vec<_>, _>>()
                .map_err(fail)?;
            groups.push(Complex { compounds });
        }
        Ok(Self { groups })
    }

    pub fn matches(&self, node: &Node) -> bool {
        self.groups.iter().any(|complex| complex.matches(node))
    }
}

/// Split on whitespace outside `[...]`.
fn split_compounds(part: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    for ch in part.chars() {
        match ch {
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            c if c.is_whitespace() && !in_brackets => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn take_ident(chars: &[char], mut pos: usize) -> (String, usize) {
    let start = pos;
    while pos < chars.len() && is_ident_char(chars[pos]) {
        pos += 1;
    }
    (chars[start..pos].iter().collect(), pos)
}

fn parse_compound(part: &str) -> Result<Compound, &'static str> {
    let chars: Vec<char> = part.chars().collect();
    let mut compound = Compound::default();
    let mut pos = 0;

    if chars[0] == '*' {
        pos = 1;
    } else if is_ident_char(chars[0]) {
        let (tag, next) = take_ident(&chars, 0);
        compound.tag = Some(tag);
        pos = next;
    }

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                let (class, next) = take_ident(&chars, pos + 1);
                if class.is_empty() {
                    return Err("expected class name after `.`");
                }
                compound.classes.push(class);
                pos = next;
            }
            '#' => {
                let (id, next) = take_ident(&chars, pos + 1);
                if id.is_empty() {
                    return Err("expected id after `#`");
                }
                compound.id = Some(id);
                pos = next;
            }
            '[' => {
                let close = chars[pos..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|offset| pos + offset)
                    .ok_or("unterminated attribute selector")?;
                let body: String = chars[pos + 1..close].iter().collect();
                let (name, value) = match body.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                        (name.trim().to_string(), Some(value.to_string()))
                    }
                    None => (body.trim().to_string(), None),
                };
                if name.is_empty() || !name.chars().all(is_ident_char) {
                    return Err("invalid attribute name");
                }
                compound.attrs.push((name, value));
                pos = close + 1;
            }
            '>' | '+' | '~' => return Err("child and sibling combinators are not supported"),
            _ => return Err("unexpected character"),
        }
    }

    Ok(compound)
}
