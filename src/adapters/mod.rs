//! Adapter layer: concrete implementations of the `domain::ports` traits
//! — language plugins, embedding/vector-store providers. Storage and
//! transport adapters live under `infrastructure`/`server` instead, since
//! they carry their own substantial submodule trees in this codebase.

pub mod plugins;
pub mod providers;
