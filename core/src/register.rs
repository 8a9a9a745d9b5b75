use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::Path,
};

use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CnpError, CnpResult};

/// The largest overpayment of a simulated customer.
const MAX_OVERPAYMENT: u32 = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banknote {
    #[serde(alias = "valoare")]
    pub value: u32,
    #[serde(alias = "stoc")]
    pub stock: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(alias = "nume")]
    pub name: String,
    #[serde(alias = "pret")]
    pub price: u32,
}

/// The content of a cash register configuration file.
/// The Romanian keys of older files are accepted too.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterConfig {
    #[serde(alias = "bancnote")]
    pub banknotes: Vec<Banknote>,
    #[serde(alias = "produse")]
    pub products: Vec<Product>,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        let banknotes = [(50, 20), (20, 30), (10, 40), (5, 50), (1, 100)]
            .into_iter()
            .map(|(value, stock)| Banknote { value, stock })
            .collect();

        let products = [
            ("Milk", 7),
            ("Bread", 3),
            ("Chocolate", 5),
            ("Water", 2),
            ("Coffee", 9),
        ]
        .into_iter()
        .map(|(name, price)| Product {
            name: name.to_owned(),
            price,
        })
        .collect();

        Self {
            banknotes,
            products,
        }
    }
}

impl RegisterConfig {
    /// Loads a configuration from a JSON file.
    pub fn load(path: &Path) -> CnpResult<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Stores this configuration to a new JSON file. Fails if the file already exists.
    pub fn store_new(&self, path: &Path) -> CnpResult<()> {
        let file = File::options().write(true).create_new(true).open(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;

        Ok(())
    }

    /// Loads a configuration, creating the file with the default configuration if it doesn't exist.
    pub fn load_or_create(path: &Path) -> CnpResult<Self> {
        match Self::load(path) {
            Err(CnpError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                info!("{} not found, creating a default configuration", path.display());
                let config = Self::default();
                config.store_new(path)?;
                Ok(config)
            }
            result => result,
        }
    }
}

/// The banknotes handed back to a customer, by value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Change(BTreeMap<u32, u32>);

impl Change {
    /// Returns the number of banknotes of the given value.
    pub fn count(&self, value: u32) -> u32 {
        self.0.get(&value).copied().unwrap_or(0)
    }

    /// Returns the amount of money handed back.
    pub fn total(&self) -> u32 {
        self.0.iter().map(|(value, count)| value * count).sum()
    }

    /// Returns the number of banknotes handed back.
    pub fn notes(&self) -> u32 {
        self.0.values().sum()
    }

    /// Iterates over the (value, count) pairs, largest value first.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().rev().map(|(&value, &count)| (value, count))
    }
}

impl Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.iter()
                .map(|(value, count)| format!("{count} x {value}"))
                .join(", ")
        )
    }
}

/// A completed or attempted sale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sale {
    pub product: String,
    pub price: u32,
    pub payment: u32,
    /// The change handed back, or `None` if the register couldn't make it.
    pub change: Option<Change>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationReport {
    /// The sales for which change was given.
    pub sales: Vec<Sale>,
    /// The sale that stopped the simulation, if any.
    pub failed: Option<Sale>,
}

/// A cash register holding a limited stock of banknotes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    /// Sorted by decreasing value.
    banknotes: Vec<Banknote>,
}

impl Register {
    pub fn new(banknotes: impl IntoIterator<Item = Banknote>) -> Self {
        Self {
            banknotes: banknotes
                .into_iter()
                .filter(|note| note.value > 0)
                .sorted_by(|a, b| b.value.cmp(&a.value))
                .collect(),
        }
    }

    pub fn banknotes(&self) -> &[Banknote] {
        &self.banknotes
    }

    /// Finds the change using the fewest banknotes the stock allows, or `None` if it can't be made.
    ///
    /// For each amount up to `amount`, the best combination is built by adding one banknote to the
    /// best combination of a smaller amount, as long as the stock holds more banknotes of that value
    /// than the smaller combination already uses.
    pub fn make_change(&self, amount: u32) -> Option<Change> {
        let amount = amount as usize;
        let n = self.banknotes.len();

        let mut best: Vec<Option<u32>> = vec![None; amount + 1];
        let mut counts = vec![vec![0u32; n]; amount + 1];
        best[0] = Some(0);

        for i in 1..=amount {
            for (j, note) in self.banknotes.iter().enumerate() {
                let value = note.value as usize;
                if value > i {
                    continue;
                }

                let Some(previous) = best[i - value] else {
                    continue;
                };

                let better = best[i].map_or(true, |current| previous + 1 < current);
                if better && note.stock > counts[i - value][j] {
                    best[i] = Some(previous + 1);
                    counts[i] = counts[i - value].clone();
                    counts[i][j] += 1;
                }
            }
        }

        best[amount]?;

        Some(Change(
            self.banknotes
                .iter()
                .zip(&counts[amount])
                .filter(|(_, count)| **count > 0)
                .map(|(note, &count)| (note.value, count))
                .collect(),
        ))
    }

    /// Removes the banknotes of the change from the stock.
    pub fn dispense(&mut self, change: &Change) {
        for note in &mut self.banknotes {
            note.stock = note.stock.saturating_sub(change.count(note.value));
        }
    }

    /// Sells random products to customers paying a random amount more than the price,
    /// until the change can't be made or `max_sales` sales were made.
    pub fn simulate<R: Rng>(
        &mut self,
        products: &[Product],
        rng: &mut R,
        max_sales: Option<usize>,
    ) -> SimulationReport {
        let mut report = SimulationReport::default();
        if products.is_empty() {
            return report;
        }

        while max_sales.map_or(true, |max| report.sales.len() < max) {
            let product = &products[rng.gen_range(0..products.len())];
            let due = rng.gen_range(1..=MAX_OVERPAYMENT);

            let mut sale = Sale {
                product: product.name.clone(),
                price: product.price,
                payment: product.price + due,
                change: None,
            };

            match self.make_change(due) {
                Some(change) => {
                    debug!("{} sold, giving back {change}", product.name);
                    self.dispense(&change);
                    sale.change = Some(change);
                    report.sales.push(sale);
                }
                None => {
                    report.failed = Some(sale);
                    break;
                }
            }
        }

        report
    }
}
