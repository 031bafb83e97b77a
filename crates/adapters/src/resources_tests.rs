use super::*;

fn limits(max_cpu: f64, max_memory: f64, max_disk: f64) -> ResourceConfig {
    ResourceConfig {
        max_cpu_percent: max_cpu,
        max_memory_percent: max_memory,
        max_disk_percent: max_disk,
    }
}

#[test]
fn check_is_none_when_all_readings_within_limits() {
    let sample = ResourceSample {
        cpu_percent: 10.0,
        memory_percent: 10.0,
        disk_percent: 10.0,
    };
    assert_eq!(sample.check(&limits(9999.0, 9999.0, 9999.0)), None);
}

#[test]
fn check_reports_each_exceeded_ceiling() {
    let sample = ResourceSample {
        cpu_percent: 95.0,
        memory_percent: 50.0,
        disk_percent: 99.0,
    };
    let alert = sample.check(&limits(90.0, 90.0, 90.0)).expect("alert");
    assert!(alert.contains("CPU"));
    assert!(alert.contains("disk"));
    assert!(!alert.contains("memory"));
}

#[test]
fn disk_percent_of_root_is_in_valid_range() {
    let pct = disk_percent(Path::new("/"));
    assert!((0.0..=100.0).contains(&pct));
}
