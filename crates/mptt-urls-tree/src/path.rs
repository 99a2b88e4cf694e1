//! Canonical tree URLs.
//!
//! The inverse of resolution: node URLs end with `/`, leaf URLs do not, and
//! the superroot is the empty path.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::node::TreeNode;

/// Characters escaped inside one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Builds the path of `entity` relative to the mount prefix.
///
/// `ancestors` are the nodes above `entity`, outermost first. Pass `None` for
/// the superroot.
///
/// # Examples
///
/// ```
/// use mptt_urls_tree::{tree_path, TreeNode};
///
/// let level1 = TreeNode::new(1, "level1", None, "Category");
/// let level2 = TreeNode::new(2, "level2", Some(1), "Category");
/// let photo = TreeNode::new(3, "photo1", Some(2), "Photo");
///
/// assert_eq!(tree_path(&[level1.clone()], Some(&level2), false), "level1/level2/");
/// assert_eq!(tree_path(&[level1, level2], Some(&photo), true), "level1/level2/photo1");
/// assert_eq!(tree_path(&[], None, false), "");
/// ```
pub fn tree_path(ancestors: &[TreeNode], entity: Option<&TreeNode>, is_leaf: bool) -> String {
    let mut path = String::new();
    for node in ancestors.iter().chain(entity) {
        path.extend(utf8_percent_encode(&node.slug, SEGMENT));
        path.push('/');
    }
    if is_leaf && entity.is_some() {
        path.pop();
    }
    path
}

/// Joins a mount prefix and a tree path into an absolute URL path.
pub fn absolute_url(prefix: &str, tree_path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    format!("{prefix}/{tree_path}")
}
