use crate::Node;
use crate::types::Id;

/// Visitor verdict for [`walk_with_ancestors`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Walk {
    Continue,
    SkipChildren,
}

/// Pre-order walk that hands every node its ancestor chain (outermost first).
pub fn walk_with_ancestors<'a, F>(root: &'a Node, mut visit: F)
where
    F: FnMut(&'a Node, &[&'a Node]) -> Walk,
{
    fn go<'a, F>(node: &'a Node, ancestors: &mut Vec<&'a Node>, visit: &mut F)
    where
        F: FnMut(&'a Node, &[&'a Node]) -> Walk,
    {
        if visit(node, ancestors) == Walk::SkipChildren {
            return;
        }
        ancestors.push(node);
        for c in node.children() {
            go(c, ancestors, visit);
        }
        ancestors.pop();
    }

    let mut ancestors = Vec::new();
    go(root, &mut ancestors, &mut visit);
}

pub fn assign_node_ids(root: &mut Node) {
    fn walk(node: &mut Node, next: &mut u32) {
        // only assign if currently unset
        if node.id() == Id::UNASSIGNED {
            node.set_id(Id(*next));
            *next = next.wrapping_add(1);
        }
        if let Some(children) = node.children_mut() {
            for c in children {
                walk(c, next);
            }
        }
    }

    let mut next = 1;
    walk(root, &mut next);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::document(vec![
            Node::element("main").with_child(
                Node::element("section")
                    .with_child(Node::element("h1").with_child(Node::text("A")))
                    .with_child(Node::element("p")),
            ),
        ])
    }

    #[test]
    fn walk_reports_ancestor_chain() {
        let dom = sample();
        let mut seen = Vec::new();
        walk_with_ancestors(&dom, |node, ancestors| {
            if node.is_element_named("h1") {
                seen = ancestors.iter().filter_map(|a| a.name()).collect::<Vec<_>>();
            }
            Walk::Continue
        });
        assert_eq!(seen, vec!["main", "section"]);
    }

    #[test]
    fn skip_children_prunes_subtree() {
        let dom = sample();
        let mut names = Vec::new();
        walk_with_ancestors(&dom, |node, _| {
            if let Some(n) = node.name() {
                names.push(n.to_string());
                if n == "section" {
                    return Walk::SkipChildren;
                }
            }
            Walk::Continue
        });
        assert_eq!(names, vec!["main", "section"]);
    }

    #[test]
    fn ids_are_assigned_in_document_order() {
        let mut dom = sample();
        assign_node_ids(&mut dom);
        assert_eq!(dom.id(), Id(1));
        let main = &dom.children()[0];
        let h1 = &main.children()[0].children()[0];
        assert_eq!(main.id(), Id(2));
        assert_eq!(h1.id(), Id(4));
    }
}
