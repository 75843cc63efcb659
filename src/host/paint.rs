//! Text painting of the live tree.
//!
//! Each node renders to zero or more lines:
//!
//! ```text
//! h1              Title            (underlined)
//! input[text]     [value]
//! input[checkbox] [x] label
//! input[radio]    (*) label
//! button          < label >
//! canvas          surface rows
//! anything else   own text, then children
//! ```
//!
//! Focused nodes get a `>` marker. Hidden nodes paint nothing.

use crate::dom::{Node, NodeFlags};

use super::layout::stack_offsets;

const FOCUS_MARK: &str = "> ";

/// Display width in terminal cells. Wide CJK and emoji count as two.
pub fn string_width(s: &str) -> u16 {
    s.chars().fold(0u16, |width, c| {
        let code = c as u32;
        let cells = if c.is_control() {
            0
        } else if (0x1100..=0x115F).contains(&code)
            || (0x2E80..=0x9FFF).contains(&code)
            || (0xAC00..=0xD7A3).contains(&code)
            || (0xF900..=0xFAFF).contains(&code)
            || (0xFF00..=0xFF60).contains(&code)
            || (0x1F300..=0x1F9FF).contains(&code)
        {
            2
        } else {
            1
        };
        width.saturating_add(cells)
    })
}

/// Cut `s` to at most `width` cells.
pub fn truncate(s: &str, width: u16) -> String {
    let mut out = String::new();
    let mut used = 0u16;
    for c in s.chars() {
        let cells = string_width(c.encode_utf8(&mut [0; 4]));
        if used + cells > width {
            break;
        }
        used += cells;
        out.push(c);
    }
    out
}

fn mark(node: &Node, line: String) -> String {
    if node.flags().contains(NodeFlags::FOCUSED) {
        format!("{FOCUS_MARK}{line}")
    } else {
        line
    }
}

/// Lines for one node and its subtree.
pub fn paint_node(node: &Node) -> Vec<String> {
    if node.flags().contains(NodeFlags::HIDDEN) {
        return Vec::new();
    }

    let tag = node.tag();
    match tag.as_str() {
        "h1" => {
            let text = node.text();
            let underline = "=".repeat(string_width(&text) as usize);
            vec![text, underline]
        }
        "input" => {
            let line = match node.attr("type").as_deref() {
                Some("checkbox") => {
                    format!("[{}] {}", if node.is_checked() { 'x' } else { ' ' }, node.text())
                }
                Some("radio") => {
                    format!("({}) {}", if node.is_checked() { '*' } else { ' ' }, node.text())
                }
                _ => {
                    let value = node.value();
                    if value.is_empty() {
                        format!("[{}]", node.attr("placeholder").unwrap_or_default())
                    } else {
                        format!("[{value}]")
                    }
                }
            };
            vec![mark(node, line)]
        }
        "button" => vec![mark(node, format!("< {} >", node.text()))],
        "canvas" => node.context_2d().map(|surface| surface.rows()).unwrap_or_default(),
        _ => {
            let mut lines = Vec::new();
            let text = node.text();
            if !text.is_empty() {
                lines.push(mark(node, text));
            }
            for child in node.children() {
                lines.extend(paint_node(&child));
            }
            lines
        }
    }
}

/// Paint every child of `root` into exactly `height` rows of at most `width` cells.
///
/// Top-level children are stacked with one blank row between them.
pub fn compose_frame(root: &Node, width: u16, height: u16) -> Vec<String> {
    let blocks: Vec<Vec<String>> = root
        .children()
        .iter()
        .map(paint_node)
        .filter(|lines| !lines.is_empty())
        .collect();
    let heights: Vec<u16> = blocks.iter().map(|lines| lines.len() as u16).collect();
    let offsets = stack_offsets(&heights, width, 1);

    let mut rows = vec![String::new(); height as usize];
    for (block, &offset) in blocks.iter().zip(&offsets) {
        for (i, line) in block.iter().enumerate() {
            let y = offset as usize + i;
            if let Some(row) = rows.get_mut(y) {
                *row = truncate(line, width);
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_width() {
        assert_eq!(string_width("abc"), 3);
        assert_eq!(string_width("日本"), 4);
        assert_eq!(string_width(""), 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("日本", 3), "日");
        assert_eq!(truncate("hi", 10), "hi");
    }

    #[test]
    fn test_paint_inputs() {
        let text = Node::new("input").with_attr("type", "text");
        text.set_value("hi");
        assert_eq!(paint_node(&text), vec!["[hi]"]);

        let check = Node::new("input").with_attr("type", "checkbox").with_text("Apple");
        check.insert_flags(NodeFlags::CHECKED | NodeFlags::FOCUSED);
        assert_eq!(paint_node(&check), vec!["> [x] Apple"]);

        let radio = Node::new("input").with_attr("type", "radio").with_text("S");
        assert_eq!(paint_node(&radio), vec!["( ) S"]);
    }

    #[test]
    fn test_paint_container_and_hidden() {
        let field = Node::new("div")
            .with_child(Node::new("label").with_text("Name"))
            .with_child(Node::new("input").with_attr("type", "file").with_flags(NodeFlags::HIDDEN))
            .with_child(Node::new("button").with_text("Go"));

        assert_eq!(paint_node(&field), vec!["Name", "< Go >"]);
    }

    #[test]
    fn test_compose_frame() {
        let root = Node::new("body")
            .with_child(Node::new("h1").with_text("Demo"))
            .with_child(Node::new("div").with_text("out"));

        let rows = compose_frame(&root, 20, 6);
        assert_eq!(rows, vec!["Demo", "====", "", "out", "", ""]);
    }
}
