use chrono::{Datelike, NaiveDate};

/// Compute the next invoice number for the period containing `today`.
///
/// Numbers are 8 characters: a YYYYMM prefix plus a zero-padded 2-digit
/// sequence. Legacy day-based numbers (YYYYMMDD) in the same period are
/// reinterpreted: their trailing 2 characters count as a sequence.
/// Unparsable tails are skipped. Pure over the existing-number snapshot.
pub fn next_invoice_number(today: NaiveDate, existing: &[String]) -> String {
    let prefix = format!("{:04}{:02}", today.year(), today.month());

    let max_seq = existing
        .iter()
        .filter(|n| n.len() == 8 && n.starts_with(&prefix))
        .filter_map(|n| n.get(6..8)?.parse::<u32>().ok())
        .max();

    let mut next_seq = max_seq.map_or(1, |m| m + 1);
    let mut candidate = format!("{prefix}{next_seq:02}");

    // Double-check global uniqueness. A single retry only: sequences past
    // 99 wrap under 2-digit formatting, a known limitation of the format.
    if existing.iter().any(|n| *n == candidate) {
        next_seq += 1;
        candidate = format!("{prefix}{next_seq:02}");
    }

    candidate
}

/// An invoice number supplied by the caller must look like YYYYMMNN.
pub fn is_well_formed(number: &str) -> bool {
    number.len() == 8 && number.bytes().all(|b| b.is_ascii_digit())
}
