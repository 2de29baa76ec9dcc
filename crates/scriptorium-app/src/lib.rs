// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod detail;
pub mod error;
pub mod export;
pub mod filter;
pub mod ids;
pub mod list;
pub mod model;
pub mod request;
pub mod route;
pub mod state;

pub use detail::*;
pub use error::*;
pub use filter::*;
pub use ids::*;
pub use list::*;
pub use model::*;
pub use request::*;
pub use route::*;
pub use state::*;
