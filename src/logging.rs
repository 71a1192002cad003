use std::io::Write;

/// Installs the process logger once: `timestamp - LEVEL - message`.
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init(level: log::LevelFilter) {
    let filters = std::env::var("RUST_LOG").ok();
    if let Err(e) = builder(level, filters.as_deref()).try_init() {
        eprintln!("Logger already initialized: {}", e);
    }
}

fn builder(level: log::LevelFilter, filters: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        // Frame-level logging from the CDP websocket.
        .filter_module("tungstenite", log::LevelFilter::Warn)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        });

    if let Some(filters) = filters {
        builder.parse_filters(filters);
    }
    builder
}
