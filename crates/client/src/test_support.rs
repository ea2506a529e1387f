//! Fixtures shared by the wiremock-backed tests.

use advising_core::pagination::{PaginationParams, TimeRangePaginationParams};
use serde_json::json;

pub fn week_params() -> TimeRangePaginationParams {
    TimeRangePaginationParams {
        base: PaginationParams {
            page: 0,
            page_size: 25,
            order_by: "start".to_string(),
            filter: String::new(),
        },
        range_start: "2024-01-01T00:00:00Z".to_string(),
        range_end: "2024-01-08T00:00:00Z".to_string(),
    }
}

pub fn drop_in_json(id: i64, start: &str) -> serde_json::Value {
    let end = chrono::DateTime::parse_from_rfc3339(start)
        .map(|s| (s + chrono::Duration::minutes(30)).to_rfc3339())
        .unwrap_or_else(|_| start.to_string());
    json!({
        "id": id,
        "name": format!("Drop-in {id}"),
        "start": start,
        "end": end,
        "location": "SN 011",
        "description": "",
        "public": true,
        "number_registered": 0,
        "registration_limit": 0,
        "advisor_id": 1,
        "advisor_slug": "cs-advising",
        "advisor_name": "CS Advising",
        "organizers": [],
        "user_registration_type": null,
        "image_url": null,
        "override_registration_url": null
    })
}

pub fn page_body(
    items: &[serde_json::Value],
    params: &TimeRangePaginationParams,
    length: u64,
) -> serde_json::Value {
    json!({
        "items": items,
        "length": length,
        "params": params,
    })
}
