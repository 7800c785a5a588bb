//! Stateless pass-through proxies to hosted inference APIs
//!
//! Neither proxy caches or transforms beyond picking the fields the
//! browser client expects.

pub mod chat;
pub mod disease;

pub use chat::ChatProxy;
pub use disease::{DiseaseProxy, Prediction};
