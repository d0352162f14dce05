//! What a node asks the runner to do next.

/// Next step after running a node.
///
/// - **Continue**: follow the node's outgoing edge (or the linear order).
/// - **Node(id)**: jump to the given node.
/// - **End**: stop and return the current state.
///
/// Nodes with conditional edges have their `Next` ignored; the router decides.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    /// Follow the outgoing edge; if there is none, equivalent to End.
    Continue,
    /// Run the node with the given id next.
    Node(String),
    /// Stop and return the current state.
    End,
}
