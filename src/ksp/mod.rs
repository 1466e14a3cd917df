// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod dijkstra;
mod error;
mod path;
mod yen;

pub use error::KspError;
pub use path::Path;
pub use yen::{k_shortest_simple_paths, KShortestPaths};
