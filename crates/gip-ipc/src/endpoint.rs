use std::path::PathBuf;

/// Server name used when the target application does not pick one.
pub const DEFAULT_SERVER_NAME: &str = "gip_instrument";

/// Filesystem path for a named stream-socket endpoint.
///
/// By convention the in-target command server listens on a socket named
/// after the server name inside the platform temp directory, so a client
/// only needs the name to find a running target. `GIP_SOCKET_DIR`
/// overrides the directory (tests point it at a private tempdir).
pub fn endpoint_path(server_name: &str) -> PathBuf {
    let dir = std::env::var("GIP_SOCKET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir());
    dir.join(server_name)
}
