//! Canonical status record and the pure normalization functions that build it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::runtime::{ContainerDetail, ContainerRef, ContainerStats, HostCapacity};

/// Container labels carrying this prefix are surfaced as extra metric
/// attributes, keyed by the remainder after the prefix.
pub const LABEL_PREFIX: &str = "otlp.label.";

/// Sentinel for unrecognized or absent health/state values.
pub const CODE_UNKNOWN: i64 = -1;

/// Runtime-agnostic snapshot of one container at collection time.
///
/// Built fresh every tick, immutable afterwards, discarded once emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerStatus {
    pub container_id: String,
    pub name: String,
    /// -1 unknown, 0 starting, 1 healthy, 2 unhealthy.
    pub health: i64,
    /// -1 unknown, 0 created, 1 restarting, 2 running, 3 removing,
    /// 4 paused, 5 exited, 6 dead.
    pub state: i64,
    pub restart_count: i64,
    /// Memory usage as a percentage of the host memory. Not clamped: usage
    /// above the recorded host total, or a zero total, reports as-is.
    pub memory_usage_percent: f64,
    pub memory_usage_bytes: i64,
    pub total_memory: i64,
    /// CPU usage as a percentage of the available CPU, normalized over all
    /// host cores.
    pub cpu_usage_percent: f64,
    pub image: String,
    pub uptime_seconds: i64,
    /// Labels matching [`LABEL_PREFIX`], prefix stripped.
    pub labels: HashMap<String, String>,
}

impl ContainerStatus {
    /// Normalizes one container's raw listing, inspection and stats data
    /// against the host capacity of the current tick.
    pub fn from_parts(
        container: &ContainerRef,
        detail: &ContainerDetail,
        stats: &ContainerStats,
        capacity: &HostCapacity,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            container_id: container.id.clone(),
            name: normalize_name(&container.name).to_string(),
            health: health_code(detail.health.as_deref()),
            state: state_code(detail.state.as_deref()),
            restart_count: detail.restart_count,
            memory_usage_percent: memory_percent(
                stats.memory_usage_bytes,
                capacity.total_memory_bytes,
            ),
            memory_usage_bytes: stats.memory_usage_bytes as i64,
            total_memory: capacity.total_memory_bytes,
            cpu_usage_percent: cpu_percent(stats.cpu_total_usage_ns, capacity.cpu_count),
            image: container.image.clone(),
            uptime_seconds: uptime_seconds(detail.started_at.as_deref(), now),
            labels: filter_labels(&detail.labels),
        }
    }
}

/// Maps the runtime's health string to its code. Absent health objects and
/// unrecognized strings map to [`CODE_UNKNOWN`].
pub fn health_code(status: Option<&str>) -> i64 {
    match status {
        Some("starting") => 0,
        Some("healthy") => 1,
        Some("unhealthy") => 2,
        _ => CODE_UNKNOWN,
    }
}

/// Maps the runtime's lifecycle state string to its code. Absent or
/// unrecognized strings map to [`CODE_UNKNOWN`].
pub fn state_code(state: Option<&str>) -> i64 {
    match state {
        Some("created") => 0,
        Some("restarting") => 1,
        Some("running") => 2,
        Some("removing") => 3,
        Some("paused") => 4,
        Some("exited") => 5,
        Some("dead") => 6,
        _ => CODE_UNKNOWN,
    }
}

/// Strips exactly one leading slash from the runtime-reported name.
pub fn normalize_name(name: &str) -> &str {
    name.strip_prefix('/').unwrap_or(name)
}

/// `usage / total * 100` in floating point. A zero total yields inf/NaN
/// rather than an error; the value is reported as computed.
pub fn memory_percent(usage_bytes: u64, total_memory_bytes: i64) -> f64 {
    usage_bytes as f64 / total_memory_bytes as f64 * 100.0
}

/// Nanosecond-resolution cumulative CPU usage, normalized over all host
/// cores and expressed as a percentage.
pub fn cpu_percent(total_usage_ns: u64, cpu_count: i64) -> f64 {
    total_usage_ns as f64 / (cpu_count as f64 * 1e9) * 100.0
}

/// Whole seconds since the reported start timestamp. Missing, unparseable
/// and pre-epoch timestamps (the runtime reports year 1 for never-started
/// containers) yield 0 rather than a fantasy uptime.
pub fn uptime_seconds(started_at: Option<&str>, now: DateTime<Utc>) -> i64 {
    let Some(started) = started_at.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok()) else {
        return 0;
    };
    let started = started.with_timezone(&Utc);
    if started.timestamp() < 0 {
        return 0;
    }
    (now - started).num_seconds()
}

/// Retains only the labels carrying [`LABEL_PREFIX`], stripped of it.
pub fn filter_labels(labels: &HashMap<String, String>) -> HashMap<String, String> {
    labels
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(LABEL_PREFIX)
                .map(|stripped| (stripped.to_string(), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_health_code_known_values() {
        assert_eq!(health_code(Some("starting")), 0);
        assert_eq!(health_code(Some("healthy")), 1);
        assert_eq!(health_code(Some("unhealthy")), 2);
    }

    #[test]
    fn test_health_code_unknown_values() {
        assert_eq!(health_code(None), -1);
        assert_eq!(health_code(Some("none")), -1);
        assert_eq!(health_code(Some("")), -1);
        assert_eq!(health_code(Some("Healthy")), -1);
    }

    #[test]
    fn test_state_code_known_values() {
        assert_eq!(state_code(Some("created")), 0);
        assert_eq!(state_code(Some("restarting")), 1);
        assert_eq!(state_code(Some("running")), 2);
        assert_eq!(state_code(Some("removing")), 3);
        assert_eq!(state_code(Some("paused")), 4);
        assert_eq!(state_code(Some("exited")), 5);
        assert_eq!(state_code(Some("dead")), 6);
    }

    #[test]
    fn test_state_code_unknown_values() {
        assert_eq!(state_code(None), -1);
        assert_eq!(state_code(Some("teleporting")), -1);
        assert_eq!(state_code(Some("Running")), -1);
    }

    #[quickcheck]
    fn prop_health_code_is_total(raw: String) -> TestResult {
        if matches!(raw.as_str(), "starting" | "healthy" | "unhealthy") {
            return TestResult::discard();
        }
        TestResult::from_bool(health_code(Some(&raw)) == CODE_UNKNOWN)
    }

    #[quickcheck]
    fn prop_state_code_is_total(raw: String) -> TestResult {
        if matches!(
            raw.as_str(),
            "created" | "restarting" | "running" | "removing" | "paused" | "exited" | "dead"
        ) {
            return TestResult::discard();
        }
        TestResult::from_bool(state_code(Some(&raw)) == CODE_UNKNOWN)
    }

    #[test]
    fn test_normalize_name_strips_one_leading_slash() {
        assert_eq!(normalize_name("/redis"), "redis");
        assert_eq!(normalize_name("redis"), "redis");
        assert_eq!(normalize_name("//redis"), "/redis");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_memory_percent_halfway() {
        // 1 GiB used out of 2 GiB total.
        let percent = memory_percent(1 << 30, 2 << 30);
        assert!((percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_memory_percent_zero_total_does_not_panic() {
        assert!(memory_percent(1024, 0).is_infinite());
        assert!(memory_percent(0, 0).is_nan());
    }

    #[quickcheck]
    fn prop_memory_percent_matches_ratio(usage: u32, total: u32) -> TestResult {
        if total == 0 {
            return TestResult::discard();
        }
        let expected = usage as f64 / total as f64 * 100.0;
        TestResult::from_bool((memory_percent(usage as u64, total as i64) - expected).abs() < 1e-9)
    }

    #[test]
    fn test_cpu_percent_two_cores() {
        // 1s of CPU time over 2 cores reads as 50% of the available CPU.
        assert!((cpu_percent(1_000_000_000, 2) - 50.0).abs() < f64::EPSILON);
        assert!((cpu_percent(2_000_000_000, 2) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_uptime_from_valid_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let uptime = uptime_seconds(Some("2024-05-01T11:58:20Z"), now);
        assert_eq!(uptime, 100);
    }

    #[test]
    fn test_uptime_defaults_to_zero() {
        let now = Utc::now();
        assert_eq!(uptime_seconds(None, now), 0);
        assert_eq!(uptime_seconds(Some("not-a-timestamp"), now), 0);
        // Docker reports year 1 for containers that never started.
        assert_eq!(uptime_seconds(Some("0001-01-01T00:00:00Z"), now), 0);
    }

    #[test]
    fn test_filter_labels_keeps_only_prefixed_keys() {
        let labels = HashMap::from([
            ("otlp.label.team".to_string(), "infra".to_string()),
            ("env".to_string(), "prod".to_string()),
            ("otlp.label.tier".to_string(), "backend".to_string()),
        ]);
        let filtered = filter_labels(&labels);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.get("team").map(String::as_str), Some("infra"));
        assert_eq!(filtered.get("tier").map(String::as_str), Some("backend"));
        assert!(!filtered.contains_key("env"));
    }

    #[test]
    fn test_from_parts_no_health_check_running_container() {
        let container = ContainerRef {
            id: "abc123".to_string(),
            name: "/web".to_string(),
            image: "nginx:latest".to_string(),
        };
        let detail = ContainerDetail {
            state: Some("running".to_string()),
            health: None,
            restart_count: 3,
            started_at: Some("2024-05-01T11:59:00Z".to_string()),
            labels: HashMap::new(),
        };
        let stats = ContainerStats {
            memory_usage_bytes: 1 << 30,
            cpu_total_usage_ns: 2_000_000_000,
        };
        let capacity = HostCapacity {
            total_memory_bytes: 2 << 30,
            cpu_count: 2,
        };
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let record = ContainerStatus::from_parts(&container, &detail, &stats, &capacity, now);
        assert_eq!(record.container_id, "abc123");
        assert_eq!(record.name, "web");
        assert_eq!(record.health, -1);
        assert_eq!(record.state, 2);
        assert_eq!(record.restart_count, 3);
        assert!((record.memory_usage_percent - 50.0).abs() < f64::EPSILON);
        assert_eq!(record.memory_usage_bytes, 1 << 30);
        assert_eq!(record.total_memory, 2 << 30);
        assert!((record.cpu_usage_percent - 100.0).abs() < f64::EPSILON);
        assert_eq!(record.image, "nginx:latest");
        assert_eq!(record.uptime_seconds, 60);
        assert!(record.labels.is_empty());
    }
}
