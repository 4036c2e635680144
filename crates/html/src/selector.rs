//! Simple compound selectors: an optional type plus `.class` / `#id` parts.
//!
//! Enough to express heading tiers like `h2.code-line` and content containers
//! like `.znc` or `article`; combinators and attribute selectors are not
//! supported and fail to parse.

use crate::Node;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
}

impl Selector {
    // input: "h1.code-line", ".znc", "#main", "article", "*"
    pub fn parse(s: &str) -> Option<Selector> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let mut sel = Selector {
            tag: None,
            ids: Vec::new(),
            classes: Vec::new(),
        };

        let split = s.find(['.', '#']).unwrap_or(s.len());
        let (head, mut rest) = s.split_at(split);
        match head {
            "" | "*" => {}
            t if is_ident(t) => sel.tag = Some(t.to_ascii_lowercase()),
            _ => return None,
        }

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let part = &body[..end];
            if !is_ident(part) {
                return None;
            }
            match marker {
                '.' => sel.classes.push(part.to_string()),
                '#' => sel.ids.push(part.to_string()),
                _ => return None,
            }
            rest = &body[end..];
        }
        Some(sel)
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn matches(&self, node: &Node) -> bool {
        let Some(name) = node.name() else {
            return false;
        };
        if let Some(tag) = &self.tag
            && !name.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        self.ids.iter().all(|id| node.attr("id") == Some(id.as_str()))
            && self.classes.iter().all(|c| node.has_class(c))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.tag {
            Some(t) => f.write_str(t)?,
            None if self.ids.is_empty() && self.classes.is_empty() => f.write_str("*")?,
            None => {}
        }
        for id in &self.ids {
            write!(f, "#{id}")?;
        }
        for c in &self.classes {
            write!(f, ".{c}")?;
        }
        Ok(())
    }
}

pub fn matches_any(selectors: &[Selector], node: &Node) -> bool {
    selectors.iter().any(|s| s.matches(node))
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
