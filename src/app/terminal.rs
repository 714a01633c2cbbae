pub(crate) fn no_color_env_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_disable_color(no_color_env: bool, dumb_terminal: bool) -> bool {
    no_color_env || dumb_terminal
}

/// Installs the stderr subscriber; stdout is reserved for command output.
pub(crate) fn init_tracing(default_level: &str, force_cli_level: bool) {
    let no_color = should_disable_color(no_color_env_requested(), is_dumb_terminal());
    let filter = if force_cli_level {
        tracing_subscriber::EnvFilter::new(default_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_env_filter(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::should_disable_color;

    #[test]
    fn test_color_disabled_by_env_or_dumb_terminal() {
        assert!(should_disable_color(true, false));
        assert!(should_disable_color(false, true));
        assert!(!should_disable_color(false, false));
    }
}
