pub(crate) const DEFAULT_ENDPOINT: &str = "127.0.0.1:7711";

/// Resolves the broker endpoint.
///
/// When `addr` is not given, `DISQUE_PROVIDER` is read to get the name of
/// the environment variable holding the address (defaults to `DISQUE_URL`),
/// and then that variable is read. When neither is defined, the default
/// local endpoint is used.
pub(crate) fn resolve_endpoint(addr: Option<&str>) -> String {
    match addr {
        Some(addr) => addr.to_string(),
        None => {
            let var_name =
                std::env::var("DISQUE_PROVIDER").unwrap_or_else(|_| "DISQUE_URL".to_string());
            std::env::var(var_name).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string())
        }
    }
}
