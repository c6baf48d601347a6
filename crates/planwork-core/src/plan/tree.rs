//! Read-only structural snapshots of a plan tree.
//!
//! Used by UI adapters to render progress alongside a status store; the
//! snapshot itself never reads task statuses.

use std::fmt;

use serde::Serialize;

/// The kind of a plan node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Parallel,
    Serial,
    Task,
    Try,
    Success,
    Failure,
    Error,
    Finally,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Parallel => "parallel",
            NodeKind::Serial => "serial",
            NodeKind::Task => "task",
            NodeKind::Try => "try",
            NodeKind::Success => "success",
            NodeKind::Failure => "failure",
            NodeKind::Error => "error",
            NodeKind::Finally => "finally",
        };
        f.write_str(name)
    }
}

/// One node of a structural snapshot: its kind, the task id for leaves, and
/// the child snapshots (branches appear after regular children, in
/// success/failure/error/finally order).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tree {
    kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_id: Option<String>,
    children: Vec<Tree>,
}

impl Tree {
    pub(crate) fn new(kind: NodeKind, task_id: Option<String>, children: Vec<Tree>) -> Self {
        Self {
            kind,
            task_id,
            children,
        }
    }

    pub(crate) fn task(id: &str) -> Self {
        Self::new(NodeKind::Task, Some(id.to_string()), Vec::new())
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The task id for task leaves, `None` for every other kind.
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn children(&self) -> &[Tree] {
        &self.children
    }
}
