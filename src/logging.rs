// Logging setup for the command-line front end
//
// Filter precedence: TAHAP_LOG environment variable, then `log.level` from the
// rc file, then "warn". Output goes to stderr so it never mixes with --json.

use env_logger::{Builder, Env};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "TAHAP_LOG";

/// Initialize the global logger; safe to call more than once
pub fn init(configured: Option<&str>) {
    let env = Env::default().filter_or(LOG_ENV, configured.unwrap_or("warn"));
    let _ = Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
