use anyhow::{Result, bail};
#[cfg(feature = "with-serde")]
use anyhow::Context;

use mailverify_lib::{Address, Reachable, SmtpDetails, VerificationResult, VerifyError};

use crate::args::Cli;

/// Une ligne de rapport, même forme que la réponse JSON du service d'origine.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct OutputRow {
    pub email: String,
    pub is_valid: bool,
    pub reachable: String,
    pub disposable: bool,
    pub role_account: bool,
    pub free: bool,
    pub has_mx_records: bool,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub suggestion: Option<String>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub username: Option<String>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub domain: Option<String>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub smtp_details: Option<SmtpDetails>,
}

impl OutputRow {
    fn blank(email: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            is_valid: false,
            reachable: String::new(),
            disposable: false,
            role_account: false,
            free: false,
            has_mx_records: false,
            suggestion: None,
            error: None,
            username: None,
            domain: None,
            smtp_details: None,
        }
    }

    pub fn from_address(address: &Address) -> Self {
        let mut row = Self::blank(&address.original);
        row.is_valid = address.valid;
        row.username = non_empty(&address.local_part);
        row.domain = non_empty(&address.domain);
        if address.valid {
            row.reachable = Reachable::Unknown.to_string();
        } else {
            row.error = Some(format!("invalid email address format: {}", address.reasons.join("; ")));
        }
        row
    }

    pub fn from_result(result: &VerificationResult) -> Self {
        let mut row = Self::from_address(&result.syntax);
        row.reachable = result.reachable.to_string();
        row.disposable = result.disposable;
        row.role_account = result.role_account;
        row.free = result.free;
        row.has_mx_records = result.has_mx_records;
        row.suggestion = result.suggestion.clone();
        row.smtp_details = result.smtp;
        if result.deadline_exceeded {
            row.error = Some("verification deadline exceeded, partial result".to_string());
        }
        row
    }

    pub fn from_error(email: &str, err: &VerifyError) -> Self {
        let mut row = Self::blank(email);
        row.error = Some(if email.trim().is_empty() {
            "email address is required".to_string()
        } else {
            format!("verification failed: {err}")
        });
        row
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

pub fn any_invalid(rows: &[OutputRow]) -> bool {
    rows.iter().any(|row| !row.is_valid)
}

pub fn write_reports(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => {
            write_human(rows);
            Ok(())
        }
        "json" => write_json(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json"),
    }
}

fn write_human(rows: &[OutputRow]) {
    for row in rows {
        if !row.is_valid {
            println!(
                "[INVALID] {} :: {}",
                row.email,
                row.error.as_deref().unwrap_or("invalid")
            );
            continue;
        }
        println!(
            "[OK]    {}  reachable={} mx={} disposable={} role={} free={}",
            row.email, row.reachable, row.has_mx_records, row.disposable, row.role_account, row.free
        );
        if let Some(suggestion) = &row.suggestion {
            println!("        suggestion: {suggestion}");
        }
        if let Some(smtp) = &row.smtp_details {
            println!(
                "        smtp: host_exists={} deliverable={} catch_all={} full_inbox={} disabled={}",
                smtp.host_exists, smtp.deliverable, smtp.catch_all, smtp.full_inbox, smtp.disabled
            );
        }
        if let Some(error) = &row.error {
            println!("        note: {error}");
        }
    }
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    let s = if rows.len() == 1 {
        serde_json::to_string_pretty(&rows[0])?
    } else {
        serde_json::to_string_pretty(rows)?
    };
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
