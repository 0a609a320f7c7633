use quire_engine::Node;

/// A document of `sections` top-level blocks, each with `children` nested
/// blocks that hold a line of text.
pub fn outline_document(sections: usize, children: usize) -> Node {
    let para = |text: String| Node::paragraph(vec![Node::text_node(text)]);
    let blocks = (0..sections)
        .map(|s| {
            let nested = (0..children)
                .map(|c| Node::block(para(format!("Item {s}.{c} with some words in it")), vec![]))
                .collect();
            Node::block(Node::heading(2, vec![Node::text_node(format!("Section {s}"))]), nested)
        })
        .collect();
    Node::doc(blocks)
}

/// Start of the text of the `index`-th textblock in document order.
pub fn textblock_start(doc: &Node, index: usize) -> usize {
    let mut starts = Vec::new();
    doc.descendants(&mut |node, pos, _, _| {
        if node.is_textblock() {
            starts.push(pos + 1);
            return false;
        }
        true
    });
    starts.get(index).copied().unwrap_or(2)
}
