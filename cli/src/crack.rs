use std::time::Instant;

use anyhow::{Context, Result};
use cnpstat_core::{crack as crack_digest, Composition};
use human_repr::HumanDuration;
use tracing::info;

use crate::Crack;

pub fn crack(args: Crack) -> Result<()> {
    let composition = Composition {
        upper: args.upper,
        lower: args.lower,
        digit: args.digit,
        special: args.special,
    };

    let length = composition
        .validate()
        .context("Unable to start the search")?;

    if let Some(space) = composition.search_space() {
        info!("Trying up to {space} candidates of {length} characters");
    }

    let start = Instant::now();
    let outcome = crack_digest(&args.digest, composition)?;

    info!(
        "{} calls made in {}",
        outcome.calls,
        start.elapsed().as_secs_f64().human_duration()
    );

    if let Some(password) = outcome.password {
        println!("{password}");
    } else {
        eprintln!("No password found for the given digest");
    }

    Ok(())
}
