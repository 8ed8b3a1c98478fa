//! Push-based reactive primitives: a BehaviorSubject-style [`Observable`], the
//! [`Reactive`] derivation type built on top of it, and the operator library that
//! transforms and combines them.

pub mod broadcast;
pub mod error;
pub mod observable;
pub mod operator;
pub mod operators;
pub mod reactive;
pub mod share;
pub mod subscription;

pub use broadcast::{Broadcast, IntoListener, Listener, ListenerGuard};
pub use error::{AdapterError, OperatorError};
pub use observable::Observable;
pub use operator::Operator;
pub use operators::*;
pub use reactive::{reactive, ObservableLike, Reactive};
pub use share::{Multicast, Share};
pub use subscription::Subscription;
