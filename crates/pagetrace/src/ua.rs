//! User-agent parsing for the browser preset attributes.

/// Browser brand and version extracted from a user-agent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentData {
    pub brand: String,
    pub version: String,
}

/// Extract a brand/version pair from a user-agent string.
///
/// Token order matters: Edge and Opera embed a `Chrome/` token, and every
/// WebKit browser embeds `Safari/`, so the more specific brands are checked
/// first. Unrecognized agents come back as `unknown` with an empty version.
pub fn parse_user_agent(ua: &str) -> UserAgentData {
    let brands = [
        ("Edg/", "Edge"),
        ("OPR/", "Opera"),
        ("Chrome/", "Chrome"),
        ("Firefox/", "Firefox"),
    ];
    for (token, brand) in brands {
        if let Some(version) = version_after(ua, token) {
            return UserAgentData {
                brand: brand.into(),
                version,
            };
        }
    }
    // Safari reports its version under a separate Version/ token.
    if ua.contains("Safari/") {
        if let Some(version) = version_after(ua, "Version/") {
            return UserAgentData {
                brand: "Safari".into(),
                version,
            };
        }
    }
    UserAgentData {
        brand: "unknown".into(),
        version: String::new(),
    }
}

fn version_after(ua: &str, token: &str) -> Option<String> {
    let rest = &ua[ua.find(token)? + token.len()..];
    let version: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}
