//! # MiniAMM Refresh Bus
//!
//! Keeps independently-polling widgets consistent after a transaction. A
//! publisher names the classes of chain state it invalidated
//! ([`RefreshTopic`]); subscribers re-fetch when a publish matches their
//! interest or carries the `All` wildcard.
//!
//! ```rust
//! use miniamm_refresh::{RefreshBus, RefreshTopic};
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! let bus = RefreshBus::new();
//! let stale = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&stale);
//! let _sub = bus.subscribe_to(&[RefreshTopic::Pool], move |_| flag.store(true, Ordering::SeqCst));
//!
//! bus.publish(&[RefreshTopic::Pool, RefreshTopic::Lp]);
//! assert!(stale.load(Ordering::SeqCst));
//! ```

pub mod bus;
pub mod topics;

pub use bus::{RefreshBus, SubscriberId, Subscription};
pub use topics::{RefreshTopic, TopicSet};
