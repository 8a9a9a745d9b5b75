use anyhow::{bail, Result};
use cnpstat_core::Cnp;
use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Color, Table};

use crate::Validate;

pub fn validate(args: Validate) -> Result<()> {
    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["CNP", "Sex", "Birth date", "County", "Sequence", "Status"]);

    let mut invalid = 0;

    for input in &args.cnps {
        match input.parse::<Cnp>() {
            Ok(cnp) => {
                let birth_date = match cnp.birth_year() {
                    Some(year) => format!("{year}-{:02}-{:02}", cnp.month(), cnp.day()),
                    None => format!("????-{:02}-{:02}", cnp.month(), cnp.day()),
                };

                display_table.add_row(vec![
                    Cell::new(cnp),
                    Cell::new(cnp.sex()),
                    Cell::new(birth_date),
                    Cell::new(format!("{:02}", cnp.county())),
                    Cell::new(format!("{:03}", cnp.sequence())),
                    Cell::new("Valid").fg(Color::Green),
                ]);
            }
            Err(err) => {
                invalid += 1;

                display_table.add_row(vec![
                    Cell::new(input),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(err).fg(Color::Red),
                ]);
            }
        }
    }

    println!("{display_table}");

    if invalid > 0 {
        bail!("{invalid} of the {} CNPs are invalid", args.cnps.len());
    }

    Ok(())
}
