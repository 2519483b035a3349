//! # flowgraph-server - REST API for the Workflow Engine
//!
//! Exposes the engine over HTTP: create graphs (from the built-in template
//! or a custom definition), run them synchronously or in the background,
//! and inspect run state and logs. Graphs and runs live in in-memory
//! stores; nothing survives a restart.
//!
//! ## Endpoints
//!
//! | Method | Path                    | Purpose                            |
//! |--------|-------------------------|------------------------------------|
//! | GET    | `/`                     | Service banner                     |
//! | GET    | `/health`               | Liveness probe                     |
//! | POST   | `/graph/create`         | Create a graph (template or custom)|
//! | POST   | `/graph/run`            | Run synchronously, return the trace|
//! | POST   | `/graph/run_async`      | Run as a background task           |
//! | GET    | `/graph/state/:run_id`  | Poll a run's status/state/logs     |

pub mod api;
pub mod store;
