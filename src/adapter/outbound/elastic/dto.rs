//! Elasticsearch request bodies and response types.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::query::ISO_DATE_FORMAT;
use crate::domain::{GeoPoint, StoredResult};
use crate::port::ProximityQuery;

/// Error type returned when creating an index that already exists.
pub const INDEX_EXISTS: &str = "resource_already_exists_exception";

/// Index mapping for stored results. The record payload is kept but not
/// indexed.
#[must_use]
pub fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "key": { "type": "keyword" },
                "location": { "type": "geo_point" },
                "date_start": { "type": "date", "format": "yyyy-MM-dd" },
                "date_end": { "type": "date", "format": "yyyy-MM-dd" },
                "record": { "type": "object", "enabled": false }
            }
        }
    })
}

/// Nearest-neighbour search: filter by radius (and date coverage), sort by
/// distance, keep one hit.
#[must_use]
pub fn nearest_query(query: &ProximityQuery) -> Value {
    let origin = GeoPoint::new(query.center).to_lon_lat();

    let mut filters = vec![json!({
        "geo_distance": {
            "distance": format!("{}km", query.radius_km),
            "location": origin
        }
    })];
    if let Some(date) = query.date {
        let date = date.format(ISO_DATE_FORMAT).to_string();
        filters.push(json!({ "range": { "date_start": { "lte": date } } }));
        filters.push(json!({ "range": { "date_end": { "gte": date } } }));
    }

    json!({
        "size": 1,
        "query": {
            "bool": {
                "must": { "match_all": {} },
                "filter": filters
            }
        },
        "sort": [{
            "_geo_distance": {
                "location": origin,
                "order": "asc",
                "unit": "km"
            }
        }]
    })
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: Hits,
}

#[derive(Debug, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_source")]
    pub source: StoredResult,
}

impl SearchResponse {
    #[must_use]
    pub fn into_nearest(self) -> Option<StoredResult> {
        self.hits.hits.into_iter().next().map(|hit| hit.source)
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Query;
    use crate::testkit::fixtures::{coordinate, record_at};
    use chrono::NaiveDate;

    #[test]
    fn query_without_date_filters_by_distance_only() {
        let body = nearest_query(&ProximityQuery {
            center: coordinate(-3.45, -60.12),
            radius_km: 100.0,
            date: None,
        });

        assert_eq!(body["size"], 1);
        let filters = body["query"]["bool"]["filter"].as_array().unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0]["geo_distance"]["distance"], "100km");
        assert_eq!(filters[0]["geo_distance"]["location"], json!([-60.12, -3.45]));
        assert_eq!(body["sort"][0]["_geo_distance"]["order"], "asc");
    }

    #[test]
    fn query_with_date_adds_coverage_ranges() {
        let body = nearest_query(&ProximityQuery {
            center: coordinate(0.0, 0.0),
            radius_km: 25.5,
            date: NaiveDate::from_ymd_opt(2022, 3, 1),
        });

        let filters = body["query"]["bool"]["filter"].as_array().unwrap();
        assert_eq!(filters.len(), 3);
        assert_eq!(filters[0]["geo_distance"]["distance"], "25.5km");
        assert_eq!(filters[1]["range"]["date_start"]["lte"], "2022-03-01");
        assert_eq!(filters[2]["range"]["date_end"]["gte"], "2022-03-01");
    }

    #[test]
    fn search_response_yields_first_hit() {
        let query = Query::parse("10", "20", "01-01-2022", "12-31-2022").unwrap();
        let stored = StoredResult::new(&query, record_at(coordinate(10.0, 20.0)));
        let body = json!({
            "took": 3,
            "hits": { "total": { "value": 1 }, "hits": [{ "_id": "x", "_source": stored }] }
        });

        let response: SearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.into_nearest(), Some(stored));
    }

    #[test]
    fn empty_search_response_is_a_miss() {
        let body = json!({ "hits": { "hits": [] } });
        let response: SearchResponse = serde_json::from_value(body).unwrap();
        assert!(response.into_nearest().is_none());
    }

    #[test]
    fn mapping_declares_geo_point() {
        let mapping = index_mapping();
        assert_eq!(mapping["mappings"]["properties"]["location"]["type"], "geo_point");
        assert_eq!(mapping["mappings"]["properties"]["record"]["enabled"], false);
    }
}
