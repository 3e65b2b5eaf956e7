//! Typed identifiers.
//!
//! Agents are numbered densely from zero and index the SoA stores directly;
//! obstacle ids are picked by whoever owns the scene; task ids are allocated
//! here, process-wide.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Position in a dense per-id `Vec`.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

typed_id! {
    /// Slot of an agent in the agent and mobility stores.  Never reused
    /// after despawn.
    pub struct AgentId(u32);
}

typed_id! {
    /// Stable identifier of one obstacle instance in the occupancy index.
    ///
    /// Chosen by the scene collaborator; the same id must be used to release
    /// or resubmit the obstacle later.
    pub struct ObstacleId(u32);
}

typed_id! {
    /// Identifier of one background rasterization task.  Later tasks get
    /// larger ids.
    pub struct TaskId(u64);
}

impl TaskId {
    /// Allocate a process-unique task id.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}
