//! Nested comments under a post.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::db::CommentRecord;
use crate::domain::Actor;
use crate::services::board_service::BoardError;

/// A comment with its replies, oldest first at every level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub id: i32,
    pub post_id: i32,
    pub author_id: String,
    pub author_name: Option<String>,
    pub content: String,
    pub parent_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
    pub replies: Vec<CommentNode>,
}

impl From<CommentRecord> for CommentNode {
    fn from(record: CommentRecord) -> Self {
        let c = record.comment;
        Self {
            id: c.id,
            post_id: c.post_id,
            author_id: c.author_id,
            author_name: record.author_name,
            content: c.content,
            parent_id: c.parent_id,
            created_at: c.created_at,
            updated_at: c.updated_at,
            replies: Vec::new(),
        }
    }
}

fn attach_replies(node: &mut CommentNode, children: &mut HashMap<i32, Vec<CommentNode>>) {
    if let Some(mut replies) = children.remove(&node.id) {
        for reply in &mut replies {
            attach_replies(reply, children);
        }
        node.replies = replies;
    }
}

/// Nests a flat, oldest-first list of comments under their parents. A comment
/// whose parent is not in the list is treated as top level.
#[must_use]
pub fn build_comment_tree(records: Vec<CommentRecord>) -> Vec<CommentNode> {
    let ids: HashSet<i32> = records.iter().map(|r| r.comment.id).collect();

    let mut roots = Vec::new();
    let mut children: HashMap<i32, Vec<CommentNode>> = HashMap::new();

    for record in records {
        let node = CommentNode::from(record);
        match node.parent_id {
            Some(parent) if ids.contains(&parent) && parent != node.id => {
                children.entry(parent).or_default().push(node);
            }
            _ => roots.push(node),
        }
    }

    for root in &mut roots {
        attach_replies(root, &mut children);
    }

    roots
}

#[async_trait::async_trait]
pub trait CommentService: Send + Sync {
    /// Adds a comment; a reply's parent must belong to the same post.
    async fn create_comment(
        &self,
        actor: &Actor,
        post_id: i32,
        content: String,
        parent_id: Option<i32>,
    ) -> Result<CommentNode, BoardError>;

    async fn list_comments(&self, post_id: i32) -> Result<Vec<CommentNode>, BoardError>;

    async fn update_comment(
        &self,
        actor: &Actor,
        post_id: i32,
        comment_id: i32,
        content: String,
    ) -> Result<CommentNode, BoardError>;

    /// Deletes the comment and lifts its replies to the top level.
    async fn delete_comment(
        &self,
        actor: &Actor,
        post_id: i32,
        comment_id: i32,
    ) -> Result<(), BoardError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::post_comments;

    fn record(id: i32, parent_id: Option<i32>) -> CommentRecord {
        CommentRecord {
            comment: post_comments::Model {
                id,
                post_id: 1,
                author_id: "u1".to_string(),
                content: format!("comment {id}"),
                parent_id,
                created_at: format!("2025-01-01T00:00:{id:02}.000000Z"),
                updated_at: String::new(),
            },
            author_name: Some("alice".to_string()),
        }
    }

    #[test]
    fn flat_list_stays_flat() {
        let tree = build_comment_tree(vec![record(1, None), record(2, None)]);
        assert_eq!(tree.len(), 2);
        assert!(tree.iter().all(|n| n.replies.is_empty()));
    }

    #[test]
    fn replies_nest_at_any_depth_in_order() {
        let tree = build_comment_tree(vec![
            record(1, None),
            record(2, Some(1)),
            record(3, Some(2)),
            record(4, Some(1)),
            record(5, None),
        ]);

        assert_eq!(tree.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 5]);
        let first = &tree[0];
        assert_eq!(
            first.replies.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![2, 4]
        );
        assert_eq!(first.replies[0].replies[0].id, 3);
    }

    #[test]
    fn orphan_becomes_top_level() {
        let tree = build_comment_tree(vec![record(2, Some(99)), record(3, Some(2))]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 2);
        assert_eq!(tree[0].replies[0].id, 3);
    }

    #[test]
    fn empty_input() {
        assert!(build_comment_tree(Vec::new()).is_empty());
    }
}
