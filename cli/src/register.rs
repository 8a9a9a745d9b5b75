use anyhow::{Context, Result};
use cnpstat_core::{Register as CashRegister, RegisterConfig};
use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Color, Table};
use tracing::info;

use crate::{seeded_rng, Register};

pub fn register(args: Register) -> Result<()> {
    let config = RegisterConfig::load_or_create(&args.data).with_context(|| {
        format!(
            "Unable to load the register configuration of {}",
            args.data.display()
        )
    })?;

    let mut rng = seeded_rng(args.seed);
    let mut register = CashRegister::new(config.banknotes);
    let report = register.simulate(&config.products, &mut rng, args.max_sales);

    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["Product", "Price", "Paid", "Change"]);

    for sale in report.sales.iter().chain(&report.failed) {
        let change = match &sale.change {
            Some(change) if change.notes() == 0 => Cell::new("None"),
            Some(change) => Cell::new(change),
            None => Cell::new(format!("Unable to give back {}", sale.payment - sale.price))
                .fg(Color::Red),
        };

        display_table.add_row(vec![
            Cell::new(&sale.product),
            Cell::new(sale.price),
            Cell::new(sale.payment),
            change,
        ]);
    }

    println!("{display_table}");

    info!("{} sales made", report.sales.len());
    if report.failed.is_some() {
        info!("The register ran out of change");
    }

    let mut stock_table = Table::new();
    stock_table.load_preset(UTF8_BORDERS_ONLY);
    stock_table.set_header(vec!["Banknote", "Left"]);

    for note in register.banknotes() {
        stock_table.add_row(vec![Cell::new(note.value), Cell::new(note.stock)]);
    }

    println!("{stock_table}");

    Ok(())
}
