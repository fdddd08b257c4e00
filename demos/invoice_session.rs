//! Invoice session walkthrough
//!
//! Seeds in-memory stores, then drives the invoice dialog through a create,
//! an edit that switches items and a rejected over-stock edit, printing item
//! stock and alerts after each step.

use anyhow::Result;
use desk::prelude::*;
use desk::telemetry;
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AdminConfig::default();
    telemetry::init_tracing(&config.logging.filter)?;

    println!("🚀 Invoice Desk Session\n");

    // Seed stores
    let acme = Company::new("Acme Corp");
    let widget = Item::new("Widget", 10.0, 2.5);
    let gadget = Item::new("Gadget", 8.0, 4.0);

    let items = Arc::new(InMemoryDataService::seeded([widget.clone(), gadget.clone()]));
    let services = InvoiceServices::new(
        Arc::new(InMemoryDataService::<Invoice>::new()),
        items.clone(),
        Arc::new(InMemoryDataService::seeded([acme.clone()])),
    );

    let coordinator = Arc::new(StockCoordinator::new(services, &config));
    let alerts = Arc::new(AlertBus::new(config.alerts.capacity));
    let mut rx = alerts.subscribe();
    let clerk = AuthContext::user(Uuid::new_v4());

    print_stock(items.as_ref(), &[&widget, &gadget]).await?;

    // Create: 4 widgets at 10% off
    println!("\n📋 Creating invoice...");
    let mut dialog =
        InvoiceDialog::open_create(coordinator.clone(), alerts.clone(), clerk.clone()).await;
    dialog.set_company(Some(acme.id));
    dialog.select_item(Some(widget.id)).await;
    dialog.set_quantity(Some(4.0));
    dialog.set_discount(Some(10.0));

    let Some(invoice) = dialog.save().await else {
        anyhow::bail!("create failed: {:?}", dialog.errors());
    };
    println!(
        "✅ {} x {} for {} (sub total {}, total {})",
        invoice.quantity(),
        invoice.item_details().unwrap_or("?"),
        invoice.company_name().unwrap_or("?"),
        invoice.sub_total.unwrap_or_default(),
        invoice.total.unwrap_or_default(),
    );
    print_alerts(&mut rx);
    print_stock(items.as_ref(), &[&widget, &gadget]).await?;

    // Edit: switch to 3 gadgets
    println!("\n✏️  Switching invoice to gadgets...");
    let mut dialog =
        InvoiceDialog::open_edit(coordinator.clone(), alerts.clone(), clerk.clone(), invoice.id)
            .await?;
    dialog.select_item(Some(gadget.id)).await;
    dialog.set_quantity(Some(3.0));
    if let Some(updated) = dialog.save().await {
        println!(
            "✅ Now {} x {} (total {})",
            updated.quantity(),
            updated.item_details().unwrap_or("?"),
            updated.total.unwrap_or_default(),
        );
    }
    print_alerts(&mut rx);
    print_stock(items.as_ref(), &[&widget, &gadget]).await?;

    // Edit: ask for more than is available
    println!("\n🚫 Requesting 20 gadgets...");
    let mut dialog =
        InvoiceDialog::open_edit(coordinator.clone(), alerts.clone(), clerk, invoice.id).await?;
    dialog.set_quantity(Some(20.0));
    if dialog.save().await.is_none() {
        for (field, message) in dialog.errors() {
            println!("   {}: {}", field, message);
        }
    }
    print_stock(items.as_ref(), &[&widget, &gadget]).await?;

    Ok(())
}

async fn print_stock(items: &InMemoryDataService<Item>, tracked: &[&Item]) -> Result<()> {
    println!("📦 Stock:");
    for item in tracked {
        let current = items.get(&item.id).await?;
        println!("   {:<8} {}", current.details, current.quantity);
    }
    Ok(())
}

fn print_alerts(rx: &mut broadcast::Receiver<Alert>) {
    while let Ok(alert) = rx.try_recv() {
        println!("🔔 [{:?}] {}: {}", alert.severity, alert.title, alert.message);
    }
}
