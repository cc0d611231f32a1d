use super::BridgeConfig;

/// Apply `BOXWATCH_*` environment overrides on top of file configuration.
///
/// Unparsable values are ignored and the file/default value is kept.
pub(super) fn apply_overrides<F>(config: &mut BridgeConfig, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = var("BOXWATCH_BIND_HOST") {
        config.ingest.host = v.clone();
        config.http.host = v;
    }
    if let Some(v) = var("BOXWATCH_TCP_PORT") {
        if let Ok(port) = v.parse::<u16>() {
            config.ingest.port = port;
        }
    }
    if let Some(v) = var("BOXWATCH_HTTP_PORT") {
        if let Ok(port) = v.parse::<u16>() {
            config.http.port = port;
        }
    }
    if let Some(v) = var("BOXWATCH_ACK_INVALID") {
        if let Ok(b) = v.parse::<bool>() {
            config.ingest.ack_invalid = b;
        }
    }
    if let Some(v) = var("BOXWATCH_SIMULATE") {
        if let Ok(b) = v.parse::<bool>() {
            config.simulation.enabled = b;
        }
    }
}
