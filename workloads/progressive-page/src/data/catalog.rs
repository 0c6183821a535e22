//! Demo catalog data with simulated latency.

use edge_sdk::edge_core::SectionLatencies;
use edge_sdk::edge_data::{Delay, Producer, ProducerGroup, SectionFuture};
use serde::{Deserialize, Serialize};

/// A product listed on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub description: String,
}

impl Product {
    fn numbered(n: usize) -> Self {
        Self {
            name: format!("Product {}", n),
            description: format!("Product {} Description", n),
        }
    }
}

/// The six demo products.
pub fn demo_products() -> Vec<Product> {
    (1..=6).map(Product::numbered).collect()
}

/// The demo categories.
pub fn demo_categories() -> Vec<String> {
    vec!["Category 1".to_string(), "Category 2".to_string()]
}

/// Futures for every demo section of one request.
pub struct PageData {
    pub profile: SectionFuture<bool>,
    pub products: SectionFuture<Vec<Product>>,
    pub categories: SectionFuture<Vec<String>>,
}

/// Start one producer per section. Each draws its own delay from the
/// configured range, so completion order differs from request to request.
pub fn spawn_producers(group: &mut ProducerGroup, latency: &SectionLatencies) -> PageData {
    PageData {
        profile: group.spawn(Producer::new(
            "profile",
            Delay::from(latency.profile),
            || true,
        )),
        products: group.spawn(Producer::new(
            "products",
            Delay::from(latency.products),
            demo_products,
        )),
        categories: group.spawn(Producer::new(
            "categories",
            Delay::from(latency.categories),
            demo_categories,
        )),
    }
}
