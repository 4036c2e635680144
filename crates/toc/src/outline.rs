//! Outline builder.
//!
//! Invariants:
//! - Every child has a strictly greater level than its parent.
//! - Pre-order traversal of the forest reproduces the input order.
//! - Levels strictly increase along any root-to-leaf path, so depth is at
//!   most six and recursive walks over the forest stay shallow.

use crate::locator::HeadingRecord;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineNode {
    pub heading: HeadingRecord,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    fn leaf(heading: HeadingRecord) -> Self {
        Self {
            heading,
            children: Vec::new(),
        }
    }

    pub fn level(&self) -> u8 {
        self.heading.level
    }
}

/// Single left-to-right pass over an explicit stack of open nodes.
///
/// A node is attached to its parent when it is closed, i.e. popped because a
/// heading of the same or shallower level arrived, or at the end of input.
/// Closing happens strictly in input order within a parent, so sibling order
/// is stable.
pub fn build_outline(headings: impl IntoIterator<Item = HeadingRecord>) -> Vec<OutlineNode> {
    let mut roots = Vec::new();
    let mut open: Vec<OutlineNode> = Vec::new();

    for heading in headings {
        while open.last().is_some_and(|top| top.level() >= heading.level) {
            close_top(&mut open, &mut roots);
        }
        open.push(OutlineNode::leaf(heading));
    }
    while !open.is_empty() {
        close_top(&mut open, &mut roots);
    }
    roots
}

fn close_top(open: &mut Vec<OutlineNode>, roots: &mut Vec<OutlineNode>) {
    let Some(done) = open.pop() else {
        return;
    };
    match open.last_mut() {
        Some(parent) => parent.children.push(done),
        None => roots.push(done),
    }
}

/// Pre-order iterator over every heading in the forest.
pub fn preorder(roots: &[OutlineNode]) -> impl Iterator<Item = &HeadingRecord> {
    let mut stack: Vec<&OutlineNode> = roots.iter().rev().collect();
    std::iter::from_fn(move || {
        let node = stack.pop()?;
        stack.extend(node.children.iter().rev());
        Some(&node.heading)
    })
}

pub fn count(roots: &[OutlineNode]) -> usize {
    preorder(roots).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(spec: &[(u8, &str)]) -> Vec<OutlineNode> {
        build_outline(spec.iter().map(|(l, t)| HeadingRecord::new(*l, *t)))
    }

    fn shape(nodes: &[OutlineNode]) -> String {
        nodes
            .iter()
            .map(|n| {
                if n.children.is_empty() {
                    n.heading.text.clone()
                } else {
                    format!("{}[{}]", n.heading.text, shape(&n.children))
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn two_levels() {
        let roots = outline(&[(1, "A"), (2, "B"), (2, "C"), (1, "D")]);
        assert_eq!(shape(&roots), "A[B,C],D");
        assert!(roots[1].children.is_empty());
    }

    #[test]
    fn regression_to_level_one_closes_everything() {
        let roots = outline(&[(1, "A"), (2, "B"), (3, "C"), (4, "D"), (1, "E"), (3, "F")]);
        assert_eq!(shape(&roots), "A[B[C[D]]],E[F]");
    }

    #[test]
    fn skipped_levels_nest_under_nearest_shallower() {
        let roots = outline(&[(1, "A"), (3, "B"), (2, "C"), (3, "D")]);
        assert_eq!(shape(&roots), "A[B,C[D]]");
    }

    #[test]
    fn starting_deep_produces_deep_roots() {
        let roots = outline(&[(3, "A"), (2, "B"), (3, "C")]);
        assert_eq!(shape(&roots), "A,B[C]");
    }

    #[test]
    fn equal_levels_are_siblings() {
        let roots = outline(&[(2, "A"), (2, "B"), (2, "C")]);
        assert_eq!(shape(&roots), "A,B,C");
    }

    #[test]
    fn empty_input() {
        assert!(outline(&[]).is_empty());
    }

    #[test]
    fn preorder_matches_input_and_count() {
        let spec = [(2, "a"), (4, "b"), (3, "c"), (1, "d"), (6, "e"), (2, "f")];
        let roots = outline(&spec);
        let order = preorder(&roots).map(|h| h.text.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(count(&roots), spec.len());
    }
}
