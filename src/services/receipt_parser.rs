use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Fields recoverable from the OCR text of a UPI payment receipt. The OCR
/// step itself happens upstream; this only structures its text output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedReceipt {
    pub amount: Option<f64>,
    /// 12-digit UTR / UPI transaction reference
    pub reference: Option<String>,
    pub payer_vpa: Option<String>,
    pub paid_on: Option<NaiveDate>,
    /// Which payment app the receipt layout looks like
    pub app: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ReceiptParseError {
    #[error("no recognizable payment fields in receipt text")]
    Unrecognized,
}

static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:₹|rs\.?|inr)\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)").unwrap());

// UTR numbers are 12 digits; labels vary wildly across apps
static LABELED_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:utr|upi\s+ref(?:erence)?(?:\s+no)?|ref(?:erence)?\s+(?:no|id)|transaction\s+id)\s*[:.#-]?\s*([0-9]{12})").unwrap()
});
static BARE_REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([0-9]{12})\b").unwrap());

static VPA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-zA-Z0-9._-]{2,})@([a-zA-Z][a-zA-Z0-9]{1,})\b").unwrap());

static NUMERIC_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([0-9]{1,2})[/-]([0-9]{1,2})[/-]([0-9]{2,4})\b").unwrap());
static WORDY_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([0-9]{1,2})\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*,?\s+([0-9]{4})\b").unwrap()
});

/// Extract payment fields from OCR'd receipt text. Succeeds when at least one
/// field is recognizable; fully unrecognizable text is an error so callers
/// can tell a bad scan apart from a receipt with sparse fields.
pub fn parse_receipt_text(text: &str) -> Result<ParsedReceipt, ReceiptParseError> {
    let parsed = ParsedReceipt {
        amount: extract_amount(text),
        reference: extract_reference(text),
        payer_vpa: extract_vpa(text),
        paid_on: extract_date(text),
        app: detect_app(text),
    };

    if parsed == ParsedReceipt::default() {
        return Err(ReceiptParseError::Unrecognized);
    }

    Ok(parsed)
}

fn extract_amount(text: &str) -> Option<f64> {
    let captures = AMOUNT_RE.captures(text)?;
    captures.get(1)?.as_str().replace(',', "").parse().ok()
}

fn extract_reference(text: &str) -> Option<String> {
    if let Some(captures) = LABELED_REF_RE.captures(text) {
        return captures.get(1).map(|m| m.as_str().to_string());
    }
    // Fall back to any bare 12-digit run, common when OCR drops the label
    BARE_REF_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn extract_vpa(text: &str) -> Option<String> {
    for captures in VPA_RE.captures_iter(text) {
        let matched = captures.get(0)?;
        // A dot right after the handle means an email domain, not a VPA
        if text[matched.end()..].starts_with('.') {
            continue;
        }
        if captures[2].len() <= 10 {
            return Some(matched.as_str().to_string());
        }
    }
    None
}

fn extract_date(text: &str) -> Option<NaiveDate> {
    if let Some(captures) = NUMERIC_DATE_RE.captures(text) {
        let day: u32 = captures[1].parse().ok()?;
        let month: u32 = captures[2].parse().ok()?;
        let mut year: i32 = captures[3].parse().ok()?;
        if year < 100 {
            year += 2000;
        }
        // Receipts in this market are day-first
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(captures) = WORDY_DATE_RE.captures(text) {
        let day: u32 = captures[1].parse().ok()?;
        let month = match captures[2].to_lowercase().as_str() {
            "jan" => 1,
            "feb" => 2,
            "mar" => 3,
            "apr" => 4,
            "may" => 5,
            "jun" => 6,
            "jul" => 7,
            "aug" => 8,
            "sep" => 9,
            "oct" => 10,
            "nov" => 11,
            "dec" => 12,
            _ => return None,
        };
        let year: i32 = captures[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn detect_app(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    if lowered.contains("google pay") || lowered.contains("gpay") {
        Some("gpay".to_string())
    } else if lowered.contains("phonepe") {
        Some("phonepe".to_string())
    } else if lowered.contains("paytm") {
        Some("paytm".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gpay_style_receipt() {
        let text = "Google Pay\n₹1,250.00\nPaid to Sharma Poultry Traders\nramesh.k@okaxis\n12 Aug 2025\nUPI transaction ID 221456789012";
        let parsed = parse_receipt_text(text).unwrap();
        assert_eq!(parsed.amount, Some(1250.0));
        assert_eq!(parsed.reference.as_deref(), Some("221456789012"));
        assert_eq!(parsed.payer_vpa.as_deref(), Some("ramesh.k@okaxis"));
        assert_eq!(parsed.paid_on, NaiveDate::from_ymd_opt(2025, 8, 12));
        assert_eq!(parsed.app.as_deref(), Some("gpay"));
    }

    #[test]
    fn parses_phonepe_style_receipt() {
        let text = "PhonePe\nPaid Rs. 430\nTo: Kisan Feeds\nUTR: 917834560921\n03/08/2025";
        let parsed = parse_receipt_text(text).unwrap();
        assert_eq!(parsed.amount, Some(430.0));
        assert_eq!(parsed.reference.as_deref(), Some("917834560921"));
        assert_eq!(parsed.paid_on, NaiveDate::from_ymd_opt(2025, 8, 3));
        assert_eq!(parsed.app.as_deref(), Some("phonepe"));
    }

    #[test]
    fn parses_paytm_receipt_with_two_digit_year() {
        let text = "Paytm payment successful INR 80.50 Ref No 445566778899 on 5-1-24 from 9876543210@ybl";
        let parsed = parse_receipt_text(text).unwrap();
        assert_eq!(parsed.amount, Some(80.5));
        assert_eq!(parsed.reference.as_deref(), Some("445566778899"));
        assert_eq!(parsed.payer_vpa.as_deref(), Some("9876543210@ybl"));
        assert_eq!(parsed.paid_on, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(parsed.app.as_deref(), Some("paytm"));
    }

    #[test]
    fn sparse_receipt_still_parses_when_one_field_is_present() {
        let parsed = parse_receipt_text("amount paid ₹200").unwrap();
        assert_eq!(parsed.amount, Some(200.0));
        assert_eq!(parsed.reference, None);
        assert_eq!(parsed.paid_on, None);
    }

    #[test]
    fn unrecognizable_text_is_an_error() {
        assert_eq!(
            parse_receipt_text("feed bags delivered to the north shed"),
            Err(ReceiptParseError::Unrecognized)
        );
        assert_eq!(parse_receipt_text(""), Err(ReceiptParseError::Unrecognized));
    }

    #[test]
    fn invalid_calendar_date_is_ignored() {
        let parsed = parse_receipt_text("₹500 paid on 32/13/2025").unwrap();
        assert_eq!(parsed.amount, Some(500.0));
        assert_eq!(parsed.paid_on, None);
    }
}
