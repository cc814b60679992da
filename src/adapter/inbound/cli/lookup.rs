//! Handler for the `lookup` command.

use crate::adapter::inbound::cli::command::LookupArgs;
use crate::adapter::inbound::cli::{output, render};
use crate::application::retrieval::nearest_or_miss;
use crate::domain::{parse_inbound_date, Coordinate};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::{Config, Credentials};
use crate::port::ProximityQuery;

/// Execute the lookup command against the fallback store only.
///
/// An unreachable store answers like an empty one.
pub async fn execute(args: &LookupArgs) -> Result<()> {
    let config = Config::load_or_default(&args.config)?;
    super::init_logging(&config);

    let center = match Coordinate::parse(&args.latitude, &args.longitude) {
        Ok(center) => center,
        Err(e) => {
            render::no_data(&format!("Invalid query: {e}"));
            return Ok(());
        }
    };

    let date = args.date.as_deref().and_then(|raw| {
        let parsed = parse_inbound_date(raw);
        if parsed.is_none() {
            output::warning(&format!("Ignoring unparsable date {raw:?} (expected MM-DD-YYYY)"));
        }
        parsed
    });

    let store = bootstrap::build_store(&config, &Credentials::from_env()).await?;
    let query = ProximityQuery {
        center,
        radius_km: config.fallback.radius_km,
        date,
    };

    match nearest_or_miss(store.as_ref(), &query).await {
        Some(hit) => {
            let distance = center.distance_km(&hit.location.coordinate());
            render::stored(&hit, distance);
        }
        None => render::no_data(&format!(
            "No stored result within {} km of {center}",
            config.fallback.radius_km
        )),
    }
    Ok(())
}
