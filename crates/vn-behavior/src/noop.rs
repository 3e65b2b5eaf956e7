//! A behavior that never issues commands.

use crate::AgentBehavior;

/// Placeholder for agents driven entirely through the navigator API.
pub struct NoopBehavior;

impl AgentBehavior for NoopBehavior {}
