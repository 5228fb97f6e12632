//! Range-scan vs. aggregation routing.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tsgate_core::query::{has_directive, ABSENT_DIRECTIVE};
use tsgate_core::{QueryParams, QueryPlan, TimestampPolicy};

fn params(agg: Option<&str>, interval: Option<&str>) -> QueryParams {
    let mut v = serde_json::json!({
        "metric_name": "CPU",
        "start_date": "2024-01-01T00:00:00Z",
        "end_date": "2024-02-01T00:00:00Z",
    });
    if let Some(a) = agg {
        v["agg_func"] = a.into();
    }
    if let Some(i) = interval {
        v["interval"] = i.into();
    }
    serde_json::from_value(v).unwrap()
}

#[test]
fn omitted_directive_defaults_to_single_space() {
    let p = params(None, None);
    assert_eq!(p.agg_func, ABSENT_DIRECTIVE);
    assert_eq!(p.interval, ABSENT_DIRECTIVE);
}

#[test]
fn blank_directive_is_range_scan() {
    for agg in [None, Some(""), Some(" "), Some("\t  \n")] {
        let plan = QueryPlan::from_params(&params(agg, Some("1h")), TimestampPolicy::Lenient).unwrap();
        match plan {
            QueryPlan::Range(r) => {
                assert_eq!(r.metric_name, "cpu");
                assert_eq!(r.start, "2024-01-01T00:00:00Z");
                assert_eq!(r.end, "2024-02-01T00:00:00Z");
            }
            other => panic!("agg {agg:?} routed to {other:?}"),
        }
    }
}

#[test]
fn non_blank_directive_is_aggregation() {
    let plan = QueryPlan::from_params(&params(Some("avg"), Some("5min")), TimestampPolicy::Lenient).unwrap();
    assert_eq!(plan.mode(), "aggregate");
    let QueryPlan::Aggregate(agg) = plan else { panic!("expected aggregate") };
    assert_eq!(agg.metric_name, "cpu");
    assert_eq!(agg.function, "AVG");
    assert_eq!(agg.interval, "5min");
}

#[test]
fn interval_is_passed_verbatim() {
    let plan = QueryPlan::from_params(&params(Some(" max "), None), TimestampPolicy::Lenient).unwrap();
    let QueryPlan::Aggregate(agg) = plan else { panic!("expected aggregate") };
    assert_eq!(agg.function, " MAX ");
    assert_eq!(agg.interval, " ");
}

#[test]
fn aggregate_args_use_remote_parameter_names() {
    let plan = QueryPlan::from_params(&params(Some("sum"), Some("1d")), TimestampPolicy::Lenient).unwrap();
    let QueryPlan::Aggregate(agg) = plan else { panic!("expected aggregate") };
    let v = serde_json::to_value(&agg).unwrap();
    assert_eq!(
        v,
        serde_json::json!({
            "p_metric_name": "cpu",
            "p_start": "2024-01-01T00:00:00Z",
            "p_end": "2024-02-01T00:00:00Z",
            "p_agg_function": "SUM",
            "p_interval": "1d",
        })
    );
}

#[test]
fn strict_policy_rejects_bad_bounds() {
    let mut p = params(None, None);
    p.start_date = "last tuesday".into();
    assert!(QueryPlan::from_params(&p, TimestampPolicy::Strict).is_err());

    let plan = QueryPlan::from_params(&p, TimestampPolicy::Lenient).unwrap();
    let QueryPlan::Range(r) = plan else { panic!("expected range") };
    assert_eq!(r.start, "last tuesday");
}

#[test]
fn compact_date_bounds_pass_through() {
    let mut p = params(None, None);
    p.start_date = "20240101".into();
    p.end_date = "20240201".into();

    let plan = QueryPlan::from_params(&p, TimestampPolicy::Lenient).unwrap();
    let QueryPlan::Range(r) = plan else { panic!("expected range") };
    assert_eq!(r.start, "20240101");
    assert_eq!(r.end, "20240201");
}

#[test]
fn has_directive_trims() {
    assert!(!has_directive(" "));
    assert!(has_directive("min"));
}
