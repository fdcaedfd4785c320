//! Core event and listener plumbing shared by transport backends

pub mod event;
pub mod listener;

pub use event::{EventDispatcher, TransportEvent};
pub use listener::{TransportListener, TransportListenerHandle};
