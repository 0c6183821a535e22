//! Public SDK for progressive HTML streaming.
//!
//! This crate re-exports the platform crates:
//!
//! ```ignore
//! use edge_sdk::prelude::*;
//!
//! let mut producers = ProducerGroup::new();
//! let products = producers.spawn(Producer::new("products", delay, load_products));
//!
//! let mut page = StreamCoordinator::new(shell, RenderMode::Streaming);
//! page.add_section(BoundSection::new(section, products, renderer).boxed())?;
//! page.run(&mut transport, &logger).await?;
//! ```

pub use edge_core;
pub use edge_data;
pub use edge_executor;
pub use edge_observability;
pub use edge_streaming;

/// Prelude for convenient imports.
pub mod prelude {
    pub use edge_core::*;
    pub use edge_data::*;
    pub use edge_executor::*;
    pub use edge_observability::*;
    pub use edge_streaming::*;
}
