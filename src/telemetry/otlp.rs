//! Pure construction of OTLP metric payloads from status records.

use opentelemetry_proto::tonic::collector::metrics::v1::ExportMetricsServiceRequest;
use opentelemetry_proto::tonic::common::v1::{
    AnyValue, InstrumentationScope, KeyValue, any_value,
};
use opentelemetry_proto::tonic::metrics::v1::{
    Gauge, Metric, NumberDataPoint, ResourceMetrics, ScopeMetrics, metric, number_data_point,
};
use opentelemetry_proto::tonic::resource::v1::Resource;

use crate::status::ContainerStatus;

/// Instrumentation scope shared by every exported instrument.
pub const SCOPE_NAME: &str = "container_statuses";

pub fn service_resource(service_name: &str, service_namespace: &str) -> Resource {
    Resource {
        attributes: vec![
            string_attr("service.name", service_name),
            string_attr("service.namespace", service_namespace),
        ],
        ..Default::default()
    }
}

/// Joins the configured prefix onto an instrument name with a dot; an empty
/// prefix leaves the name untouched.
pub fn metric_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// One request per tick: a single resource/scope pair carrying eight gauge
/// instruments with one data point per record each.
pub fn build_export_request(
    resource: Resource,
    prefix: &str,
    records: &[ContainerStatus],
    time_unix_nano: u64,
) -> ExportMetricsServiceRequest {
    let mut memory_usage_percent = Vec::with_capacity(records.len());
    let mut memory_usage_bytes = Vec::with_capacity(records.len());
    let mut total_memory = Vec::with_capacity(records.len());
    let mut cpu_usage_percent = Vec::with_capacity(records.len());
    let mut restart_count = Vec::with_capacity(records.len());
    let mut health = Vec::with_capacity(records.len());
    let mut state = Vec::with_capacity(records.len());
    let mut uptime = Vec::with_capacity(records.len());

    for record in records {
        let attrs = record_attributes(record);
        memory_usage_percent.push(double_point(&attrs, time_unix_nano, record.memory_usage_percent));
        memory_usage_bytes.push(int_point(&attrs, time_unix_nano, record.memory_usage_bytes));
        total_memory.push(int_point(&attrs, time_unix_nano, record.total_memory));
        cpu_usage_percent.push(double_point(&attrs, time_unix_nano, record.cpu_usage_percent));
        restart_count.push(int_point(&attrs, time_unix_nano, record.restart_count));
        health.push(int_point(&attrs, time_unix_nano, record.health));
        state.push(int_point(&attrs, time_unix_nano, record.state));
        uptime.push(int_point(&attrs, time_unix_nano, record.uptime_seconds));
    }

    let metrics = vec![
        gauge(metric_name(prefix, "memory_usage_percent"), "%", memory_usage_percent),
        gauge(metric_name(prefix, "memory_usage_bytes"), "By", memory_usage_bytes),
        gauge(metric_name(prefix, "total_memory"), "By", total_memory),
        gauge(metric_name(prefix, "cpu_usage_percent"), "%", cpu_usage_percent),
        gauge(metric_name(prefix, "restart_count"), "1", restart_count),
        gauge(metric_name(prefix, "health"), "1", health),
        gauge(metric_name(prefix, "state"), "1", state),
        gauge(metric_name(prefix, "uptime"), "s", uptime),
    ];

    ExportMetricsServiceRequest {
        resource_metrics: vec![ResourceMetrics {
            resource: Some(resource),
            scope_metrics: vec![ScopeMetrics {
                scope: Some(InstrumentationScope {
                    name: SCOPE_NAME.to_string(),
                    ..Default::default()
                }),
                metrics,
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

/// Attribute set shared by every measurement of one record: the container
/// identity plus its filtered labels, sorted by key so the attribute order
/// is stable across ticks.
fn record_attributes(record: &ContainerStatus) -> Vec<KeyValue> {
    let mut attrs = vec![
        string_attr("container_id", &record.container_id),
        string_attr("name", &record.name),
        string_attr("image", &record.image),
    ];
    let mut labels: Vec<_> = record.labels.iter().collect();
    labels.sort_by(|a, b| a.0.cmp(b.0));
    attrs.extend(labels.into_iter().map(|(key, value)| string_attr(key, value)));
    attrs
}

fn string_attr(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue {
            value: Some(any_value::Value::StringValue(value.to_string())),
        }),
    }
}

fn gauge(name: String, unit: &str, data_points: Vec<NumberDataPoint>) -> Metric {
    Metric {
        name,
        unit: unit.to_string(),
        data: Some(metric::Data::Gauge(Gauge { data_points })),
        ..Default::default()
    }
}

fn double_point(attrs: &[KeyValue], time_unix_nano: u64, value: f64) -> NumberDataPoint {
    NumberDataPoint {
        attributes: attrs.to_vec(),
        time_unix_nano,
        value: Some(number_data_point::Value::AsDouble(value)),
        ..Default::default()
    }
}

fn int_point(attrs: &[KeyValue], time_unix_nano: u64, value: i64) -> NumberDataPoint {
    NumberDataPoint {
        attributes: attrs.to_vec(),
        time_unix_nano,
        value: Some(number_data_point::Value::AsInt(value)),
        ..Default::default()
    }
}
