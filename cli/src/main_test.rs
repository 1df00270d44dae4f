use tracing::level_filters::LevelFilter;

use super::*;

#[test]
fn log_filter_honors_rust_log_level() {
    assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
    assert_eq!(log_filter(Some("report_canvas=trace")).max_level_hint(), Some(LevelFilter::TRACE));
}

#[test]
fn log_filter_defaults_to_info() {
    assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
}
