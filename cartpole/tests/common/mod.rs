use log::LevelFilter;

#[ctor::ctor]
fn init_test_logging() {
    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .is_test(true)
        .init()
}
