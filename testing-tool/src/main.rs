use anyhow::Result;
use colored::*;
use dealer_catalog::cache::{
    CacheConfig, CatalogFilters, CatalogView, ConnectionState, FallbackController, LoadOutcome,
};
use dealer_catalog::client::CatalogClient;
use dealer_catalog::services::SortKey;
use std::io::{self, Write};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    println!("{}", "🚗 Dealer Catalog Probe".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());

    let config = CacheConfig::from_env()?;
    println!("🌐 Server: {}", config.api_base);
    match &config.cache_path {
        Some(path) => println!("💾 Cache file: {}", path.display()),
        None => println!("💾 Cache: in memory"),
    }

    let client = CatalogClient::new(config.api_base.clone(), config.fetch_timeout)?;
    let storage = config.open_storage();
    let controller = FallbackController::new(Arc::new(client), storage, config);

    report(controller.refresh().await, &controller.view().await);

    loop {
        println!();
        println!("{}", "📋 MAIN MENU".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 🔄 Refresh");
        println!("2. 🔍 Change filters");
        println!("3. ➕ Load more");
        println!("4. 📄 Show vehicles");
        println!("5. 🚪 Exit");
        let choice = prompt("Choose an option (1-5): ")?;

        match choice.as_str() {
            "1" => report(controller.refresh().await, &controller.view().await),
            "2" => {
                let filters = read_filters(&controller.filters().await)?;
                report(controller.set_filters(filters).await, &controller.view().await);
            }
            "3" => report(controller.load_more().await, &controller.view().await),
            "4" => show_vehicles(&controller.view().await),
            "5" => {
                println!("{}", "👋 Bye!".bright_green());
                break;
            }
            _ => println!("{}", "❌ Invalid option, try again.".bright_red()),
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Blank answers keep the current value
fn read_filters(current: &CatalogFilters) -> Result<CatalogFilters> {
    println!("{}", "🔍 FILTERS (blank keeps the current value)".bright_cyan().bold());

    let vehicle_type = prompt(&format!("Type [{}]: ", current.vehicle_type))?;
    let search = prompt(&format!("Search [{}]: ", current.search))?;
    let sort = prompt(&format!(
        "Sort (price-asc, price-desc, year-desc, km-asc, km-desc) [{}]: ",
        current.sort
    ))?;

    Ok(CatalogFilters {
        vehicle_type: if vehicle_type.is_empty() {
            current.vehicle_type.clone()
        } else {
            vehicle_type
        },
        search: if search.is_empty() {
            current.search.clone()
        } else {
            search
        },
        sort: if sort.is_empty() {
            current.sort
        } else {
            SortKey::parse_or_default(Some(&sort))
        },
    })
}

fn report(outcome: LoadOutcome, view: &CatalogView) {
    println!();
    match outcome {
        LoadOutcome::Live => println!(
            "{} {} of {} vehicles (page {})",
            "🟢 LIVE".bright_green().bold(),
            view.vehicles.len(),
            view.total,
            view.page
        ),
        LoadOutcome::Stale { saved_at } => println!(
            "{} showing {} cached vehicles saved at {}",
            "🟠 OFFLINE".bright_yellow().bold(),
            view.vehicles.len(),
            saved_at.to_rfc3339()
        ),
        LoadOutcome::Unavailable => println!(
            "{} server unreachable and no usable cache",
            "🔴 UNAVAILABLE".bright_red().bold()
        ),
        LoadOutcome::Superseded => println!("{}", "⏭️ Superseded by a newer request".dimmed()),
        LoadOutcome::Exhausted => println!("{}", "✅ No more pages".bright_blue()),
    }
    if view.has_more {
        println!("{}", "   More pages available (option 3)".dimmed());
    }
}

fn show_vehicles(view: &CatalogView) {
    let state = match view.state {
        ConnectionState::Live => "live".bright_green(),
        ConnectionState::Offline => "offline".bright_yellow(),
    };
    println!();
    println!("📄 {} vehicles ({})", view.vehicles.len(), state);
    for vehicle in &view.vehicles {
        println!(
            "  #{:<4} {:<30} {:>10.2} €  {:<6} {} km  [{}]",
            vehicle.id, vehicle.title, vehicle.price, vehicle.vehicle_type, vehicle.km, vehicle.status
        );
    }
}
