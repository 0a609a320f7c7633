//! Replacing a range of a tree with a slice.
//!
//! The range `from..to` and the slice may both cut through nodes. The nodes
//! open on the left of the range are joined with the slice's open start, the
//! slice's open end with the nodes open on the right of the range, and every
//! node rebuilt along the way is checked against its content expression.

use super::{Fragment, ModelError, Node, ResolvedPos, Slice, fragment::push_joined};

pub(crate) fn replace(from: &ResolvedPos, to: &ResolvedPos, slice: &Slice) -> Result<Node, ModelError> {
    if slice.open_start() > from.depth() {
        return Err(ModelError::Replace(
            "inserted content deeper than insertion position".into(),
        ));
    }
    if from.depth() - slice.open_start() != to.depth().wrapping_sub(slice.open_end()) {
        return Err(ModelError::Replace("inconsistent open depths".into()));
    }
    replace_outer(from, to, slice, 0)
}

fn replace_outer(from: &ResolvedPos, to: &ResolvedPos, slice: &Slice, depth: usize) -> Result<Node, ModelError> {
    let index = from.index(depth);
    let node = from.node(depth);
    if index == to.index(depth) && depth < from.depth() - slice.open_start() {
        let inner = replace_outer(from, to, slice, depth + 1)?;
        return Ok(node.copy(node.content().replace_child(index, inner)));
    }
    if slice.content().size() == 0 {
        return close(node, replace_two_way(from, to, depth)?);
    }
    if slice.open_start() == 0 && slice.open_end() == 0 && from.depth() == depth && to.depth() == depth {
        let parent = from.parent();
        let content = parent.content();
        let joined = content
            .cut(0, from.parent_offset())
            .append(slice.content())
            .append(&content.cut(to.parent_offset(), content.size()));
        return close(parent, joined);
    }
    let (start, end) = prepare_slice_for_replace(slice, from)?;
    close(node, replace_three_way(from, &start, &end, to, depth)?)
}

fn check_join(main: &Node, sub: &Node) -> Result<(), ModelError> {
    if sub.kind().compatible_content(main.kind()) {
        Ok(())
    } else {
        Err(ModelError::Replace(format!(
            "cannot join {} onto {}",
            sub.kind(),
            main.kind()
        )))
    }
}

fn joinable(before: &ResolvedPos, after: &ResolvedPos, depth: usize) -> Result<Node, ModelError> {
    let node = before.node(depth);
    check_join(node, after.node(depth))?;
    Ok(node.clone())
}

fn add_range(start: Option<&ResolvedPos>, end: Option<&ResolvedPos>, depth: usize, target: &mut Vec<Node>) {
    let Some(node) = end.or(start).map(|p| p.node(depth)) else {
        return;
    };
    let mut start_index = 0;
    let end_index = end.map_or(node.child_count(), |e| e.index(depth));
    if let Some(start) = start {
        start_index = start.index(depth);
        if start.depth() > depth {
            start_index += 1;
        } else if start.text_offset() > 0 {
            if let Some(after) = start.node_after() {
                push_joined(target, after);
            }
            start_index += 1;
        }
    }
    for i in start_index..end_index {
        push_joined(target, node.child(i).clone());
    }
    if let Some(end) = end {
        if end.depth() == depth && end.text_offset() > 0 {
            if let Some(before) = end.node_before() {
                push_joined(target, before);
            }
        }
    }
}

fn close(node: &Node, content: Fragment) -> Result<Node, ModelError> {
    if !node.kind().valid_content(content.iter()) {
        return Err(ModelError::InvalidContent { kind: node.kind() });
    }
    Ok(node.copy(content))
}

fn replace_three_way(
    from: &ResolvedPos,
    start: &ResolvedPos,
    end: &ResolvedPos,
    to: &ResolvedPos,
    depth: usize,
) -> Result<Fragment, ModelError> {
    let open_start = if from.depth() > depth {
        Some(joinable(from, start, depth + 1)?)
    } else {
        None
    };
    let open_end = if to.depth() > depth {
        Some(joinable(end, to, depth + 1)?)
    } else {
        None
    };

    let mut content = Vec::new();
    add_range(None, Some(from), depth, &mut content);
    match (&open_start, &open_end) {
        (Some(os), Some(oe)) if start.index(depth) == end.index(depth) => {
            check_join(os, oe)?;
            let inner = replace_three_way(from, start, end, to, depth + 1)?;
            push_joined(&mut content, close(os, inner)?);
        }
        _ => {
            if let Some(os) = &open_start {
                push_joined(&mut content, close(os, replace_two_way(from, start, depth + 1)?)?);
            }
            add_range(Some(start), Some(end), depth, &mut content);
            if let Some(oe) = &open_end {
                push_joined(&mut content, close(oe, replace_two_way(end, to, depth + 1)?)?);
            }
        }
    }
    add_range(Some(to), None, depth, &mut content);
    Ok(Fragment::from_vec(content))
}

fn replace_two_way(from: &ResolvedPos, to: &ResolvedPos, depth: usize) -> Result<Fragment, ModelError> {
    let mut content = Vec::new();
    add_range(None, Some(from), depth, &mut content);
    if from.depth() > depth {
        let node = joinable(from, to, depth + 1)?;
        push_joined(&mut content, close(&node, replace_two_way(from, to, depth + 1)?)?);
    }
    add_range(Some(to), None, depth, &mut content);
    Ok(Fragment::from_vec(content))
}

/// Wraps the slice in copies of the ancestors of `along` so that both of
/// its edges can be resolved at the same depths as the replaced range.
fn prepare_slice_for_replace(slice: &Slice, along: &ResolvedPos) -> Result<(ResolvedPos, ResolvedPos), ModelError> {
    let extra = along.depth() - slice.open_start();
    let parent = along.node(extra);
    let mut node = parent.copy(slice.content().clone());
    for i in (0..extra).rev() {
        node = along.node(i).copy(Fragment::from_node(node));
    }
    let start = node.resolve(slice.open_start() + extra)?;
    let end = node.resolve(node.content_size() - slice.open_end() - extra)?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(text: &str) -> Node {
        Node::paragraph(vec![Node::text_node(text)])
    }

    fn b(text: &str, children: Vec<Node>) -> Node {
        Node::block(p(text), children)
    }

    #[test]
    fn delete_text_inside_paragraph() {
        let doc = Node::doc(vec![b("Hello", vec![])]);
        let result = doc.replace(3, 5, &Slice::empty()).unwrap();
        assert_eq!(result, Node::doc(vec![b("Hlo", vec![])]));
    }

    #[test]
    fn insert_flat_text() {
        let doc = Node::doc(vec![b("ac", vec![])]);
        let slice = Slice::from_nodes(vec![Node::text_node("b")]);
        let result = doc.replace(3, 3, &slice).unwrap();
        assert_eq!(result, Node::doc(vec![b("abc", vec![])]));
    }

    #[test]
    fn delete_across_blocks_joins_paragraphs() {
        // 0 block 1 p 2 "ab" 4 /p 5 /block 6 block 7 p 8 "cd" 10
        let doc = Node::doc(vec![b("ab", vec![]), b("cd", vec![])]);
        let result = doc.replace(3, 9, &Slice::empty()).unwrap();
        assert_eq!(result, Node::doc(vec![b("ad", vec![])]));
    }

    #[test]
    fn split_with_open_slice() {
        let doc = Node::doc(vec![b("abcd", vec![])]);
        let slice = Slice::new(
            Fragment::from_vec(vec![
                Node::block(Node::paragraph(vec![]), vec![]),
                Node::block(Node::paragraph(vec![]), vec![]),
            ]),
            2,
            2,
        );
        let result = doc.replace(4, 4, &slice).unwrap();
        assert_eq!(result, Node::doc(vec![b("ab", vec![]), b("cd", vec![])]));
    }

    #[test]
    fn invalid_result_is_refused() {
        let doc = Node::doc(vec![b("ab", vec![])]);
        let err = doc.replace(0, 6, &Slice::empty()).unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidContent {
                kind: crate::model::NodeKind::Doc
            }
        );
    }

    #[test]
    fn text_directly_in_block_is_refused() {
        let doc = Node::doc(vec![b("ab", vec![])]);
        let slice = Slice::from_nodes(vec![Node::text_node("x")]);
        assert!(doc.replace(5, 5, &slice).is_err());
    }

    #[test]
    fn inconsistent_open_depths() {
        let doc = Node::doc(vec![b("ab", vec![])]);
        let slice = Slice::new(Fragment::from_node(p("x")), 1, 0);
        assert_eq!(
            doc.replace(3, 3, &slice).unwrap_err(),
            ModelError::Replace("inconsistent open depths".into())
        );
    }

    #[test]
    fn range_ending_at_another_depth_fails() {
        let doc = Node::doc(vec![b("ab", vec![]), b("cd", vec![])]);
        assert!(doc.replace(3, 6, &Slice::empty()).is_err());
    }
}
