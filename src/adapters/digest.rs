//! HTTP digest access authentication (RFC 2617, MD5, `qop=auth`), which the
//! Atlas Admin API requires for programmatic API keys.

use crate::utils::error::{ReporterError, Result};
use rand::RngCore;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub qop: Option<String>,
    pub opaque: Option<String>,
    pub algorithm: Option<String>,
}

impl DigestChallenge {
    /// Parses a `WWW-Authenticate: Digest ...` header value.
    pub fn parse(header: &str) -> Result<Self> {
        let rest = header
            .trim()
            .strip_prefix("Digest")
            .ok_or_else(|| ReporterError::AuthorizationError {
                status: 401,
                message: format!("unsupported authentication challenge: {}", header),
            })?;

        let params = parse_params(rest);
        let required = |key: &str| {
            params.get(key).cloned().ok_or_else(|| ReporterError::AuthorizationError {
                status: 401,
                message: format!("digest challenge is missing '{}'", key),
            })
        };

        Ok(Self {
            realm: required("realm")?,
            nonce: required("nonce")?,
            // "auth,auth-int" 時只用 auth
            qop: params.get("qop").map(|q| {
                q.split(',')
                    .map(str::trim)
                    .find(|q| *q == "auth")
                    .unwrap_or(q.as_str())
                    .to_string()
            }),
            opaque: params.get("opaque").cloned(),
            algorithm: params.get("algorithm").cloned(),
        })
    }

    /// Builds the `Authorization` header value for one request.
    pub fn authorization(
        &self,
        username: &str,
        password: &str,
        method: &str,
        uri: &str,
        cnonce: &str,
        nonce_count: u32,
    ) -> String {
        let ha1 = md5_hex(&format!("{}:{}:{}", username, self.realm, password));
        let ha2 = md5_hex(&format!("{}:{}", method, uri));
        let nc = format!("{:08x}", nonce_count);

        let response = match &self.qop {
            Some(qop) => md5_hex(&format!(
                "{}:{}:{}:{}:{}:{}",
                ha1, self.nonce, nc, cnonce, qop, ha2
            )),
            None => md5_hex(&format!("{}:{}:{}", ha1, self.nonce, ha2)),
        };

        let mut header = format!(
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\"",
            username, self.realm, self.nonce, uri, response
        );
        if let Some(qop) = &self.qop {
            header.push_str(&format!(", qop={}, nc={}, cnonce=\"{}\"", qop, nc, cnonce));
        }
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(", opaque=\"{}\"", opaque));
        }
        if let Some(algorithm) = &self.algorithm {
            header.push_str(&format!(", algorithm={}", algorithm));
        }
        header
    }
}

pub fn new_cnonce() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

fn parse_params(input: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut chars = input.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
            chars.next();
        }

        let key: String = chars
            .by_ref()
            .take_while(|c| *c != '=')
            .collect::<String>()
            .trim()
            .to_ascii_lowercase();
        if key.is_empty() {
            break;
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => break,
                    _ => value.push(c),
                }
            }
        } else {
            loop {
                while let Some(c) = chars.peek() {
                    if *c == ',' {
                        break;
                    }
                    value.push(*c);
                    chars.next();
                }

                // 未加引號的清單 (qop=auth,auth-int)：逗號後不是 key=value 就仍屬同一個值
                let mut lookahead = chars.clone();
                if lookahead.next() != Some(',') {
                    break;
                }
                let next: String = lookahead.take_while(|c| *c != ',').collect();
                if next.trim().is_empty() || next.contains('=') {
                    break;
                }
                chars.next();
                value.push(',');
            }
            value = value.trim().to_string();
        }

        params.insert(key, value);
    }

    params
}
