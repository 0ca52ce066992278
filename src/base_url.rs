//! API 基础地址解析
//!
//! - 本地回环主机：使用相对前缀，由开发服务器代理到后端
//! - 配置了 `api_origin`：直接使用
//! - 其他情况：取页面来源，若端口是开发端口则替换为 API 端口

use crate::config::ClientConfig;

/// 解析 API 基础地址
///
/// # Arguments
/// * `hostname` - 页面主机名（`location.hostname`）
/// * `origin` - 页面来源（`location.origin`）
pub fn resolve_base_url(config: &ClientConfig, hostname: &str, origin: &str) -> String {
    if is_loopback(config, hostname) {
        return config.api_prefix.clone();
    }

    let api_origin = match &config.api_origin {
        Some(origin) => origin.clone(),
        None => swap_dev_port(origin, &config.dev_ports, config.api_port),
    };

    format!("{}{}", api_origin.trim_end_matches('/'), config.api_prefix)
}

fn is_loopback(config: &ClientConfig, hostname: &str) -> bool {
    config
        .loopback_hosts
        .iter()
        .any(|h| h.eq_ignore_ascii_case(hostname))
}

/// 仅替换来源中的端口部分，主机名里出现的数字不受影响
fn swap_dev_port(origin: &str, dev_ports: &[u16], api_port: u16) -> String {
    let origin = origin.trim_end_matches('/');
    let Some((scheme, authority)) = origin.split_once("://") else {
        return origin.to_string();
    };

    match authority.rsplit_once(':') {
        Some((host, port))
            if port
                .parse::<u16>()
                .is_ok_and(|p| dev_ports.contains(&p)) =>
        {
            format!("{}://{}:{}", scheme, host, api_port)
        }
        _ => origin.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localhost_uses_relative_prefix() {
        let config = ClientConfig::default();
        assert_eq!(
            resolve_base_url(&config, "localhost", "http://localhost:5173"),
            "/api/v1"
        );
        assert_eq!(
            resolve_base_url(&config, "127.0.0.1", "http://127.0.0.1:5174"),
            "/api/v1"
        );
    }

    #[test]
    fn test_dev_port_replaced() {
        let config = ClientConfig::default();
        assert_eq!(
            resolve_base_url(&config, "10.0.0.8", "http://10.0.0.8:5173"),
            "http://10.0.0.8:8080/api/v1"
        );
        assert_eq!(
            resolve_base_url(&config, "console.lan", "http://console.lan:5174"),
            "http://console.lan:8080/api/v1"
        );
    }

    #[test]
    fn test_other_ports_untouched() {
        let config = ClientConfig::default();
        assert_eq!(
            resolve_base_url(&config, "admin.example.com", "https://admin.example.com"),
            "https://admin.example.com/api/v1"
        );
        assert_eq!(
            resolve_base_url(&config, "admin.example.com", "https://admin.example.com:9443"),
            "https://admin.example.com:9443/api/v1"
        );
    }

    #[test]
    fn test_digits_in_hostname_untouched() {
        let config = ClientConfig::default();
        assert_eq!(
            resolve_base_url(&config, "node5173.example.com", "https://node5173.example.com"),
            "https://node5173.example.com/api/v1"
        );
    }

    #[test]
    fn test_configured_origin_wins() {
        let config = ClientConfig::default().with_api_origin(Some("https://api.example.com/"));
        assert_eq!(
            resolve_base_url(&config, "10.0.0.8", "http://10.0.0.8:5173"),
            "https://api.example.com/api/v1"
        );
        // 本地开发仍走代理
        assert_eq!(
            resolve_base_url(&config, "localhost", "http://localhost:5173"),
            "/api/v1"
        );
    }
}
