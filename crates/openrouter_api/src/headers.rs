use std::collections::BTreeMap;

use crate::config::OpenRouterConfig;
use crate::error::OpenRouterError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_REFERER: &str = "HTTP-Referer";
pub const HEADER_TITLE: &str = "X-Title";
pub const HEADER_USER_AGENT: &str = "User-Agent";

/// Build a deterministic header map for OpenRouter requests.
///
/// `streaming` selects the `accept` value: SSE for stream calls, JSON
/// otherwise.
pub fn build_headers(
    config: &OpenRouterConfig,
    streaming: bool,
    user_agent: Option<&str>,
) -> Result<BTreeMap<String, String>, OpenRouterError> {
    let mut headers = BTreeMap::new();

    let api_key = sanitize_nonempty(&config.api_key).ok_or(OpenRouterError::MissingApiKey)?;

    headers.insert(
        HEADER_AUTHORIZATION.to_owned(),
        format!("Bearer {api_key}"),
    );
    headers.insert(
        HEADER_ACCEPT.to_owned(),
        if streaming {
            "text/event-stream".to_owned()
        } else {
            "application/json".to_owned()
        },
    );
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    if let Some(referer) = config.referer.as_deref().and_then(sanitize_nonempty) {
        headers.insert(HEADER_REFERER.to_owned(), referer);
    }
    if let Some(title) = config.app_title.as_deref().and_then(sanitize_nonempty) {
        headers.insert(HEADER_TITLE.to_owned(), title);
    }

    let ua = match (user_agent, config.user_agent.as_deref()) {
        (Some(explicit), _) if !explicit.trim().is_empty() => explicit.trim().to_owned(),
        (None, Some(explicit)) if !explicit.trim().is_empty() => explicit.trim().to_owned(),
        _ => default_user_agent(),
    };
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    Ok(headers)
}

fn sanitize_nonempty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match runtime_os_triplet() {
        Some((platform, release, arch)) => {
            format!("reasoning-chat/{version} ({platform} {release}; {arch})")
        }
        None => format!(
            "reasoning-chat/{version} ({}; {})",
            std::env::consts::OS,
            normalize_arch(std::env::consts::ARCH)
        ),
    }
}

fn normalize_arch(arch: &str) -> String {
    match arch.to_ascii_lowercase().as_str() {
        "x86_64" | "amd64" => "x64".to_owned(),
        "x86" | "i386" | "i686" => "ia32".to_owned(),
        "aarch64" => "arm64".to_owned(),
        normalized => normalized.to_owned(),
    }
}

#[cfg(unix)]
fn runtime_os_triplet() -> Option<(String, String, String)> {
    use std::ffi::CStr;
    use std::mem::MaybeUninit;

    let mut raw = MaybeUninit::<libc::utsname>::uninit();
    // SAFETY: `uname` initializes the provided `utsname` struct on success.
    let rc = unsafe { libc::uname(raw.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }

    // SAFETY: We checked `uname` returned success, so `raw` is initialized.
    let raw = unsafe { raw.assume_init() };
    // SAFETY: `uname` provides NUL-terminated fixed-size C strings.
    let platform = unsafe { CStr::from_ptr(raw.sysname.as_ptr()) }
        .to_string_lossy()
        .to_lowercase();
    // SAFETY: `uname` provides NUL-terminated fixed-size C strings.
    let release = unsafe { CStr::from_ptr(raw.release.as_ptr()) }
        .to_string_lossy()
        .into_owned();
    // SAFETY: `uname` provides NUL-terminated fixed-size C strings.
    let arch = unsafe { CStr::from_ptr(raw.machine.as_ptr()) }.to_string_lossy();
    let arch = normalize_arch(&arch);

    if platform.is_empty() || release.is_empty() || arch.is_empty() {
        None
    } else {
        Some((platform, release, arch))
    }
}

#[cfg(not(unix))]
fn runtime_os_triplet() -> Option<(String, String, String)> {
    None
}

#[cfg(test)]
mod tests {
    use super::{default_user_agent, normalize_arch};

    #[test]
    fn arch_names_are_normalized() {
        assert_eq!(normalize_arch("x86_64"), "x64");
        assert_eq!(normalize_arch("AARCH64"), "arm64");
        assert_eq!(normalize_arch("riscv64"), "riscv64");
    }

    #[test]
    fn default_user_agent_names_the_client() {
        assert!(default_user_agent().starts_with("reasoning-chat/"));
    }
}
