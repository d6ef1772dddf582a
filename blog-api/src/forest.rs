use std::collections::HashMap;

use crate::{Comment, CommentId, CommentNode};

/// Deepest level a reply is nested at, top-level comments being at 0.
///
/// Replies further down are listed with their ancestor at `MAX_DEPTH - 1`,
/// next to its direct replies and oldest first. This keeps the JSON nesting of
/// a listing within what `serde_json` reads back.
pub const MAX_DEPTH: usize = 32;

/// Assembles the flat comments of one article into reply trees.
///
/// Top-level comments and the replies of each node come out oldest first. A
/// comment whose parent is missing, is itself, or sits in a reply cycle is
/// shown at top level rather than dropped. Nesting stops at [`MAX_DEPTH`].
pub fn build_forest(mut comments: Vec<Comment>) -> Vec<CommentNode> {
    comments.sort_by_key(|c| c.created_at);

    let mut index = HashMap::<CommentId, usize>::with_capacity(comments.len());
    for (i, c) in comments.iter().enumerate() {
        index.entry(c.id).or_insert(i);
    }

    let mut parent = vec![None; comments.len()];
    let mut children = vec![Vec::new(); comments.len()];
    let mut roots = Vec::new();
    for (i, c) in comments.iter().enumerate() {
        match c.parent_id.and_then(|p| index.get(&p)) {
            Some(&p) if p != i => {
                parent[i] = Some(p);
                children[p].push(i);
            }
            _ => roots.push(i),
        }
    }

    // Walk down from the roots, keeping only the first path reaching each
    // node. Whatever is left unvisited hangs off a cycle. `host` is the node
    // whose replies list the current one.
    let mut visited = vec![false; comments.len()];
    let mut kept = vec![Vec::new(); comments.len()];
    let mut preorder = Vec::with_capacity(comments.len());
    let mut walk = |root: usize, visited: &mut Vec<bool>| {
        let mut stack = vec![(root, 0, root)];
        visited[root] = true;
        while let Some((n, depth, host)) = stack.pop() {
            preorder.push(n);
            let (depth, host) = match depth < MAX_DEPTH {
                true => (depth + 1, n),
                false => (depth, host),
            };
            for &c in &children[n] {
                if !visited[c] {
                    visited[c] = true;
                    kept[host].push(c);
                    stack.push((c, depth, host));
                }
            }
        }
    };
    for &r in &roots {
        walk(r, &mut visited);
    }
    for i in 0..comments.len() {
        if visited[i] {
            continue;
        }
        // The parent of an unvisited comment is unvisited too, so going up
        // always ends in a cycle. Its oldest member becomes a root.
        let mut on_path = HashMap::new();
        let mut path = Vec::new();
        let mut n = i;
        let cycle_start = loop {
            if let Some(&pos) = on_path.get(&n) {
                break pos;
            }
            on_path.insert(n, path.len());
            path.push(n);
            match parent[n] {
                Some(p) => n = p,
                None => break path.len() - 1,
            }
        };
        let promoted = path[cycle_start..].iter().copied().min().unwrap_or(i);
        tracing::warn!(
            comment = ?comments[promoted].id,
            "reply cycle detected, promoting to top level"
        );
        roots.push(promoted);
        walk(promoted, &mut visited);
    }
    roots.sort_unstable();
    // Replies lifted from below MAX_DEPTH were pushed after their host's own
    for replies in &mut kept {
        replies.sort_unstable();
    }

    // Children always come after their parent in preorder, so building in
    // reverse has every reply ready before the node that owns it.
    let mut comments = comments.into_iter().map(Some).collect::<Vec<_>>();
    let mut built = (0..comments.len()).map(|_| None).collect::<Vec<_>>();
    for &n in preorder.iter().rev() {
        let replies = kept[n]
            .iter()
            .map(|&c| built[c].take().expect("reply built before its parent"))
            .collect();
        let comment = comments[n].take().expect("comment used twice in forest");
        built[n] = Some(CommentNode { comment, replies });
    }

    roots
        .into_iter()
        .map(|r| built[r].take().expect("root was not built"))
        .collect()
}
