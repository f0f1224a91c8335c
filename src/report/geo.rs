// Fetching and parsing of the boundary dataset for the choropleth.

use std::time::Duration;

use log::{debug, info, warn};
use snafu::{OptionExt, ResultExt};

use serde_json::Value as JSValue;

use vote_growth::{normalize_key, Region};

use crate::report::*;

/// Municipalities of the state of Rio de Janeiro, from the geodata-br
/// project. Overridable with --geo-url.
pub const DEFAULT_GEO_URL: &str =
    "https://raw.githubusercontent.com/tbrugz/geodata-br/master/geojson/geojs-33-mun.json";

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const FETCH_ATTEMPTS: u32 = 3;

/// The boundary dataset: the named regions for the join, plus the raw
/// feature collection (with annotated join keys) for the HTML export.
#[derive(PartialEq, Debug, Clone)]
pub struct GeoData {
    pub regions: Vec<Region>,
    pub collection: JSValue,
}

/// Extracts the regions out of a GeoJSON-like feature collection and
/// annotates every feature with its normalized join key under
/// `properties.id`, so that the exported collection can be matched
/// against the choropleth entries.
///
/// Features without a `properties.name` are skipped with a warning.
pub fn parse_boundaries(mut js: JSValue) -> ReportResult<GeoData> {
    let features = js
        .get_mut("features")
        .and_then(|f| f.as_array_mut())
        .context(GeoShapeSnafu {})?;

    let mut regions: Vec<Region> = Vec::new();
    for feature in features.iter_mut() {
        let name = match feature
            .get("properties")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
        {
            Some(n) => n.to_string(),
            None => {
                warn!("parse_boundaries: skipping a feature without properties.name");
                continue;
            }
        };
        let key = normalize_key(&name);
        if let Some(props) = feature
            .get_mut("properties")
            .and_then(|p| p.as_object_mut())
        {
            props.insert("id".to_string(), JSValue::String(key));
        }
        regions.push(Region::new(&name));
    }
    debug!("parse_boundaries: {:?} regions", regions.len());
    Ok(GeoData {
        regions,
        collection: js,
    })
}

/// One GET of the boundary dataset, with a bounded timeout so that an
/// unresponsive host cannot hang the first render.
pub fn fetch_boundaries(url: &str) -> ReportResult<GeoData> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context(GeoClientSnafu {})?;
    info!("Attempting to fetch the boundary dataset from {:?}", url);
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .context(GeoFetchSnafu { url })?;
    let js: JSValue = response.json().context(GeoFetchSnafu { url })?;
    parse_boundaries(js)
}

/// Fetches the boundary dataset with bounded retries and linear
/// backoff. The caller decides what a total failure means; for the
/// dashboard it only disables the map view.
pub fn load_boundaries(url: &str) -> ReportResult<GeoData> {
    let mut last_err: Option<ReportError> = None;
    for attempt in 0..FETCH_ATTEMPTS {
        if attempt > 0 {
            let delay = Duration::from_secs(attempt as u64);
            warn!(
                "Boundary fetch retry {}/{} after {:?}",
                attempt,
                FETCH_ATTEMPTS - 1,
                delay
            );
            std::thread::sleep(delay);
        }
        match fetch_boundaries(url) {
            Ok(g) => return Ok(g),
            Err(e) => {
                warn!("Boundary fetch attempt failed: {}", e);
                last_err = Some(e);
            }
        }
    }
    match last_err {
        Some(e) => Err(e),
        None => GeoShapeSnafu {}.fail(),
    }
}
