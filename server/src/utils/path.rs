//! Path helpers

use std::path::PathBuf;

/// Expand `~` and make relative paths absolute against the working directory.
///
/// ```text
/// expand_path("~/.cassandra-datasource") // -> /home/user/.cassandra-datasource
/// expand_path("certs/ca.pem")            // -> /current/dir/certs/ca.pem
/// expand_path("/etc/ssl/ca.pem")         // -> /etc/ssl/ca.pem
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => dirs::home_dir()
            .map(|home| home.join(&rest[1..]))
            .unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_expand_path_absolute() {
        assert_eq!(expand_path("/etc/ssl/ca.pem"), PathBuf::from("/etc/ssl/ca.pem"));
    }

    #[test]
    fn test_expand_path_relative() {
        let result = expand_path("certs/client.pem");
        assert!(result.is_absolute());
        assert_eq!(
            result,
            std::env::current_dir().unwrap().join("certs/client.pem")
        );
    }

    #[test]
    fn test_expand_path_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
            assert_eq!(expand_path("~/certs"), home.join("certs"));
        }
    }

    #[test]
    fn test_expand_path_tilde_user_is_relative() {
        let result = expand_path("~other/file");
        assert!(result.ends_with("~other/file"));
    }
}
