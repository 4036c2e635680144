use proptest::prelude::*;
use toc::outline::{OutlineNode, preorder};
use toc::{HeadingRecord, build_outline};

fn children_are_deeper(nodes: &[OutlineNode]) -> bool {
    nodes.iter().all(|n| {
        n.children.iter().all(|c| c.level() > n.level()) && children_are_deeper(&n.children)
    })
}

/// A later root of deeper level would have been adopted by the earlier one,
/// so root levels never increase.
fn roots_have_no_shallower_predecessor(roots: &[OutlineNode]) -> bool {
    roots.windows(2).all(|w| w[1].level() <= w[0].level())
}

proptest! {
    #[test]
    fn forest_is_level_consistent_and_order_preserving(
        spec in prop::collection::vec((1u8..=6, "[a-z]{1,6}"), 0..64)
    ) {
        let input = spec
            .iter()
            .map(|(level, text)| HeadingRecord::new(*level, text.clone()))
            .collect::<Vec<_>>();
        let roots = build_outline(input.clone());

        prop_assert!(children_are_deeper(&roots));
        prop_assert!(roots_have_no_shallower_predecessor(&roots));

        let walked = preorder(&roots).cloned().collect::<Vec<_>>();
        prop_assert_eq!(walked, input);
    }
}

#[test]
fn end_to_end_shape() {
    let roots = build_outline(
        [(1, "A"), (2, "B"), (2, "C"), (1, "D")]
            .into_iter()
            .map(|(l, t)| HeadingRecord::new(l, t)),
    );
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0].heading.text, "A");
    let kids = roots[0]
        .children
        .iter()
        .map(|c| c.heading.text.as_str())
        .collect::<Vec<_>>();
    assert_eq!(kids, vec!["B", "C"]);
    assert_eq!(roots[1].heading.text, "D");
    assert!(roots[1].children.is_empty());
}
