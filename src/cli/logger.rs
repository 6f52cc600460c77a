use log::LevelFilter;

/// Initialise logging; `RUST_LOG` wins over `verbose`
pub fn init_logger(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) => {
            builder.filter_level(if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Warn
            });
        }
    }
    // A logger may already be installed, e.g. by a test harness
    let _ = builder.try_init();
}
