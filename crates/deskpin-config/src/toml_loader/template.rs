/// Documented default config written on first run.
pub(super) fn default_config_toml() -> &'static str {
    r#"# deskpin configuration
# Every value below is the built-in default; delete what you do not change.

[native]
# Bridge process that talks to the desktop environment.
command = "deskpin-bridge"
args = []
# "length-prefixed" (native messaging) or "lines"
framing = "length-prefixed"

[host]
# Framing of the windowing-host protocol on stdin/stdout.
framing = "lines"

[workspace]
# Quiet period before a desktop/activity switch is believed, in ms.
debounce_ms = 10
# Session keys used for persisted window membership and placed-tab markers.
storage_key = "pos"
tab_marker_key = "placed"
# Claim handshakes per window before giving up, and the pause between them.
claim_max_attempts = 20
claim_retry_delay_ms = 50

[logging]
# trace, debug, info, warn, error
level = "info"
"#
}
