//! Foundation layer - Core abstractions and type system.
//!
//! This module contains the fundamental building blocks of Vigil:
//! - Lifecycle events emitted by the pipeline
//! - Message snapshots carried by those events
//! - Delivery-time error types

pub mod error;
pub mod event;
pub mod message;

pub use error::{BoxError, EvalError, EvalResult};
pub use event::{EventKind, LifecycleEvent, Outcome};
pub use message::{BodyDisplay, Message};
