//! Style-sheet merging (word/styles.xml)
//!
//! Callers hand in style definitions produced elsewhere, either as a bare
//! fragment of `w:style` elements or as a complete `w:styles` document.
//! Every style definition found is appended to the style-sheet part.

use crate::body::{parse_fragment, strip_line_breaks};
use crate::dom::{XmlElement, XmlNode, XmlTree};
use crate::error::Result;

/// Append every style definition found in `fragment` as the last children
/// of the style-sheet root, in fragment document order.
///
/// Style definitions are matched by local name `style` at any depth. No
/// de-duplication by style id is performed; merging the same fragment
/// twice produces duplicate definitions. Returns the re-serialized style
/// sheet with line breaks stripped, and the number of styles imported.
pub(crate) fn merge_styles(styles_xml: &str, fragment: &str) -> Result<(String, usize)> {
    let mut imported = Vec::new();
    for element in parse_fragment(fragment)? {
        collect_styles(&element, &mut imported);
    }

    let mut tree = XmlTree::parse(styles_xml)?;
    let count = imported.len();
    for style in imported {
        tree.root.children.push(XmlNode::Element(style));
    }

    Ok((strip_line_breaks(&tree.to_xml()), count))
}

fn collect_styles(element: &XmlElement, found: &mut Vec<XmlElement>) {
    if element.local_name() == "style" {
        found.push(element.clone());
    }
    for child in element.child_elements() {
        collect_styles(child, found);
    }
}
