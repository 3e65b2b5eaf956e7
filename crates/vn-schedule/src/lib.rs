//! `vn-schedule` — the queues the control loop is built around.
//!
//! | Module          | Contents                                            |
//! |-----------------|-----------------------------------------------------|
//! | [`admission`]   | `AdmissionQueue` (agents waiting for a search slot) |
//! | [`action`]      | `ActionQueue<T>` (worker → control loop messages)   |
//! | [`wake_queue`]  | `WakeQueue` (tick-keyed behavior wake-ups)          |

pub mod action;
pub mod admission;
pub mod wake_queue;


pub use action::ActionQueue;
pub use admission::AdmissionQueue;
pub use wake_queue::WakeQueue;
