//! Walk through a cart session against in-memory collaborators
//!
//! Run with an optional YAML config path:
//!
//! ```sh
//! RUST_LOG=cart=debug cargo run --example cart_demo -- cart.yaml
//! ```

use anyhow::Result;
use cart::prelude::*;
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

fn sneaker(title: &str, price: f64, n: u32) -> Product {
    Product {
        title: title.to_string(),
        price,
        image: format!("https://cdn.example.com/sneakers/{n}.jpg"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => CartConfig::from_yaml_file(&path)?,
        None => CartConfig::default(),
    };

    println!("🛒 Cart Demo");
    println!("============\n");

    let inventory = InMemoryInventory::new()
        .with_product(ProductId::new(1), sneaker("Trail Runner", 179.9, 1), 3)
        .with_product(ProductId::new(2), sneaker("Court Classic", 139.9, 2), 5)
        .with_product(ProductId::new(3), sneaker("Last Pair", 219.9, 3), 1);

    let engine = CartEngineBuilder::from_config(config)
        .with_inventory_and_catalog(inventory.clone())
        .build()
        .await?;

    let updates = engine.events().stream();
    let printer = tokio::spawn(async move {
        tokio::pin!(updates);
        while let Some(envelope) = updates.next().await {
            println!(
                "📣 v{} {} → {} item(s)",
                envelope.version,
                envelope.event.action(),
                envelope.cart.total_quantity()
            );
        }
    });

    let requests = [
        Mutation::AddItem(ProductId::new(1)),
        Mutation::AddItem(ProductId::new(1)),
        Mutation::AddItem(ProductId::new(1)),
        Mutation::AddItem(ProductId::new(3)),
        Mutation::AddItem(ProductId::new(2)),
        Mutation::SetQuantity {
            product_id: ProductId::new(2),
            amount: 4,
        },
        Mutation::SetQuantity {
            product_id: ProductId::new(2),
            amount: 0,
        },
        Mutation::RemoveItem(ProductId::new(1)),
        Mutation::RemoveItem(ProductId::new(1)),
    ];

    for mutation in requests {
        match engine.apply(mutation).await {
            Ok(_) => println!("✅ {} {}", mutation.name(), mutation.product_id()),
            Err(err) => println!(
                "❌ {} {}: {} ({})",
                mutation.name(),
                mutation.product_id(),
                err.user_message(),
                err.error_code()
            ),
        }
    }

    println!("\n📦 Final cart:");
    for entry in engine.cart().entries() {
        println!(
            "   {} x {} @ {:.2}",
            entry.quantity, entry.product.title, entry.product.price
        );
    }

    // Dropping the engine closes the bus, which ends the printer's stream
    drop(engine);
    printer.await?;
    Ok(())
}
