//! Financial calculators behind the public tools pages.
//!
//! Every calculator is a pure function from a validated input to a result
//! struct. Nothing here performs I/O or keeps state between calls.

pub mod cpp;
pub mod loan;
pub mod resp;
pub mod savings;
pub mod tax;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies which tool produced a result (also used as a lead source tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Loan,
    Savings,
    Tax,
    Resp,
    Cpp,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Loan,
        ToolKind::Savings,
        ToolKind::Tax,
        ToolKind::Resp,
        ToolKind::Cpp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Loan => "loan",
            ToolKind::Savings => "savings",
            ToolKind::Tax => "tax",
            ToolKind::Resp => "resp",
            ToolKind::Cpp => "cpp",
        }
    }

    /// Human readable name used in emails and prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Loan => "Loan Payment Calculator",
            ToolKind::Savings => "Savings Growth Calculator",
            ToolKind::Tax => "Federal Tax Bracket Calculator",
            ToolKind::Resp => "RESP Projection Calculator",
            ToolKind::Cpp => "CPP Start Age Calculator",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "loan" => Ok(ToolKind::Loan),
            "savings" => Ok(ToolKind::Savings),
            "tax" => Ok(ToolKind::Tax),
            "resp" => Ok(ToolKind::Resp),
            "cpp" => Ok(ToolKind::Cpp),
            other => Err(format!("Unknown tool: {}", other)),
        }
    }
}

/// Rounds a money amount to cents, half away from zero.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats a dollar amount with thousands separators and no cents: `$50,197`.
pub fn format_dollars(value: f64) -> String {
    let whole = value.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if whole < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_kind_roundtrip_str() {
        for kind in ToolKind::ALL {
            assert_eq!(kind.as_str().parse::<ToolKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_tool_kind_parse_is_lenient_on_case() {
        assert_eq!(" RESP ".parse::<ToolKind>().unwrap(), ToolKind::Resp);
        assert!("mortgage".parse::<ToolKind>().is_err());
    }

    #[test]
    fn test_tool_kind_serde() {
        let json = serde_json::to_string(&ToolKind::Cpp).unwrap();
        assert_eq!(json, "\"cpp\"");
        let parsed: ToolKind = serde_json::from_str("\"savings\"").unwrap();
        assert_eq!(parsed, ToolKind::Savings);
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(1.005_1), 1.01);
        assert_eq!(round_cents(2.344), 2.34);
        assert_eq!(round_cents(-2.345_1), -2.35);
    }

    #[test]
    fn test_format_dollars() {
        assert_eq!(format_dollars(0.0), "$0");
        assert_eq!(format_dollars(999.0), "$999");
        assert_eq!(format_dollars(50_197.0), "$50,197");
        assert_eq!(format_dollars(1_234_567.4), "$1,234,567");
        assert_eq!(format_dollars(-1_500.0), "-$1,500");
    }
}
