//! Textual security rules: line-anchored regular expressions over the raw
//! source. These run even when a file cannot be parsed, and they are
//! best-effort by construction; without semantic scope information they can
//! both false-positive and false-negative. They are kept separate from the
//! AST rules so the precision difference stays visible.

use crate::config::SecurityRules;
use crate::core::{Severity, SourceFile, Vulnerability};
use once_cell::sync::Lazy;
use regex::Regex;

static SQL_CONCAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)["'`]\s*(select\s+.+\s+from|insert\s+into|update\s+\w+\s+set|delete\s+from)[^"'`]*["'`]?\s*\+"#,
    )
    .expect("sql concat pattern")
});

static SQL_INTERPOLATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(select\s+.+\s+from|insert\s+into|update\s+\w+\s+set|delete\s+from).*\$\{")
        .expect("sql interpolation pattern")
});

static HARDCODED_SECRET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(api[_-]?key|apikey|secret|password|passwd|token)\s*[:=]\s*["'][^"']{8,}["']"#)
        .expect("secret pattern")
});

static WEAK_HASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"createHash\(\s*["'](md5|sha1)["']"#).expect("weak hash pattern")
});

static MATH_RANDOM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Math\.random\(\)").expect("math random pattern"));

static SECURITY_CONTEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(token|secret|password|otp|session|nonce)").expect("context"));

pub fn scan(file: &SourceFile, rules: &SecurityRules) -> Vec<Vulnerability> {
    let mut found = Vec::new();

    for (idx, line) in file.content.lines().enumerate() {
        let line_no = idx + 1;

        if rules.sql_injection && (SQL_CONCAT.is_match(line) || SQL_INTERPOLATION.is_match(line)) {
            found.push(textual(
                "sql-injection",
                Severity::High,
                "query string built from a variable",
                file,
                line_no,
                Some("use parameterized queries"),
            ));
        }

        if rules.hardcoded_secret && HARDCODED_SECRET.is_match(line) {
            found.push(textual(
                "hardcoded-secret",
                Severity::Medium,
                "credential value embedded in source",
                file,
                line_no,
                Some("move the value to environment or secret storage"),
            ));
        }

        if rules.weak_hash {
            if let Some(captures) = WEAK_HASH.captures(line) {
                let algorithm = captures.get(1).map(|m| m.as_str()).unwrap_or("weak");
                found.push(textual(
                    "weak-hash",
                    Severity::Medium,
                    &format!("{algorithm} is cryptographically broken"),
                    file,
                    line_no,
                    Some("use sha256 or stronger"),
                ));
            }
        }

        if rules.insecure_random
            && MATH_RANDOM.is_match(line)
            && SECURITY_CONTEXT.is_match(line)
        {
            found.push(textual(
                "insecure-random",
                Severity::Low,
                "Math.random() used for a security-sensitive value",
                file,
                line_no,
                Some("use crypto.randomBytes or crypto.getRandomValues"),
            ));
        }
    }

    found
}

fn textual(
    kind: &str,
    severity: Severity,
    message: &str,
    file: &SourceFile,
    line: usize,
    suggestion: Option<&str>,
) -> Vulnerability {
    Vulnerability {
        kind: kind.to_string(),
        severity,
        message: message.to_string(),
        file: file.path.clone(),
        line: Some(line),
        suggestion: suggestion.map(str::to_string),
    }
}
