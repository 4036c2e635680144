use crate::Node;

/// Heading level for `h1`..`h6` tag names.
pub fn heading_level(name: &str) -> Option<u8> {
    let b = name.as_bytes();
    if b.len() == 2 && (b[0] | 0x20) == b'h' && (b'1'..=b'6').contains(&b[1]) {
        Some(b[1] - b'0')
    } else {
        None
    }
}

#[inline]
fn is_ascii_ws(byte: u8) -> bool {
    matches!(byte, b' ' | b'\n' | b'\t' | b'\r' | b'\x0c')
}

/// Concatenated text of every descendant text node, like `textContent`.
pub fn text_content(node: &Node) -> String {
    fn go(node: &Node, out: &mut String) {
        match node {
            Node::Text { text, .. } => out.push_str(text),
            Node::Element { children, .. } | Node::Document { children, .. } => {
                for c in children {
                    go(c, out);
                }
            }
            Node::Comment { .. } => {}
        }
    }
    let mut out = String::new();
    go(node, &mut out);
    out
}

/// Trim and collapse runs of ASCII whitespace into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for ch in s.chars() {
        if ch.is_ascii() && is_ascii_ws(ch as u8) {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    out
}
