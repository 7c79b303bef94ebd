//! Tree statistics for `check`

use std::fmt;

use crate::domain::ConnectionTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSummary {
    pub containers: usize,
    pub connections: usize,
    pub depth: usize,
    /// Nodes alive in the tree but not reachable from the root
    pub detached: usize,
}

impl TreeSummary {
    pub fn of(tree: &ConnectionTree) -> Self {
        let (containers, connections) = tree
            .iter()
            .fold((0, 0), |(containers, connections), (_, node)| {
                if node.is_container() {
                    (containers + 1, connections)
                } else {
                    (containers, connections + 1)
                }
            });
        Self {
            containers,
            connections,
            depth: tree.depth(),
            detached: tree.len() - containers - connections,
        }
    }
}

impl fmt::Display for TreeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} containers, {} connections, depth {}",
            self.containers, self.connections, self.depth
        )?;
        if self.detached > 0 {
            write!(f, ", {} detached", self.detached)?;
        }
        Ok(())
    }
}
