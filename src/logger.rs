/// Environment variable that overrides the log filter (env_logger syntax).
pub const LOG_ENV: &str = "PYBOIL_LOG";

pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .parse_env(LOG_ENV)
        .init();
}
