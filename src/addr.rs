//! Address parsing for the receiving service (host[:port] or eqx://host[:port])

use std::fmt;

use anyhow::{Context, Result};

use crate::protocol::DEFAULT_PORT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr {
    pub host: String,
    pub port: u16,
}

impl RemoteAddr {
    pub fn new<S: Into<String>>(host: S, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// This machine's hostname on the default port.
    pub fn local_default() -> Result<Self> {
        Ok(Self::new(local_hostname()?, DEFAULT_PORT))
    }
}

impl fmt::Display for RemoteAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

pub fn local_hostname() -> Result<String> {
    let name = hostname::get().context("Failed to read local hostname")?;
    Ok(name.to_string_lossy().into_owned())
}

/// Host and, when one was written, the explicit port.
pub fn split_host_port(s: &str) -> Option<(String, Option<u16>)> {
    let s_trim = s.trim();
    let mut rest = s_trim;
    if let Some(scheme_end) = s_trim.find("://") {
        if !s_trim[..scheme_end].eq_ignore_ascii_case("eqx") {
            return None;
        }
        rest = &s_trim[scheme_end + 3..];
    }
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return None;
    }
    // [v6]:port
    if let Some(inner) = rest.strip_prefix('[') {
        let (host, tail) = inner.split_once(']')?;
        let port = match tail.strip_prefix(':') {
            Some(p) => Some(p.parse().ok()?),
            None if tail.is_empty() => None,
            None => return None,
        };
        return Some((host.to_string(), port));
    }
    match rest.rsplit_once(':') {
        Some((h, p)) if !h.contains(':') => {
            if h.is_empty() {
                return None;
            }
            Some((h.to_string(), Some(p.parse().ok()?)))
        }
        _ => Some((rest.to_string(), None)),
    }
}
