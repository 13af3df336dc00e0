//! Co-ownership PDF report.
//!
//! A [`Report`] is laid out from a [`Ledger`] first, then rendered to PDF
//! bytes by [`render_pdf`]. Layout is plain data so it can be checked
//! without parsing PDF output.

mod error;
mod pdf;

pub use error::ReportError;
pub use pdf::render_pdf;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::balance::Ledger;

/// Report title.
pub const REPORT_TITLE: &str = "Tanzia - Rapport de Copropriete";

/// A table in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section heading.
    pub heading: String,
    /// Column titles with their widths in millimetres.
    pub columns: Vec<(String, u16)>,
    /// Formatted cells, one `Vec` per row.
    pub rows: Vec<Vec<String>>,
}

/// A fully laid out report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Document title.
    pub title: String,
    /// Date line under the title.
    pub date_line: String,
    /// Tables, in print order. Empty tables are omitted.
    pub sections: Vec<Section>,
    /// Label and value of the closing total.
    pub global_balance: (String, String),
    /// Generation notice.
    pub footer: String,
}

/// Formats an amount with two decimals and the currency.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2} EUR", amount.round_dp(2))
}

/// Download file name for a report generated on `date`.
#[must_use]
pub fn report_filename(date: NaiveDate) -> String {
    format!("tanzia-rapport-{}.pdf", date.format("%Y-%m-%d"))
}

fn columns(titles: &[(&str, u16)]) -> Vec<(String, u16)> {
    titles
        .iter()
        .map(|(title, width)| ((*title).to_string(), *width))
        .collect()
}

fn entry_section(heading: &str, entries: &[(String, Decimal)], total_share: u64) -> Option<Section> {
    if entries.is_empty() {
        return None;
    }
    Some(Section {
        heading: heading.to_string(),
        columns: columns(&[("Libelle", 80), ("Montant", 50), ("Total Tantiemes", 50)]),
        rows: entries
            .iter()
            .map(|(label, amount)| vec![label.clone(), format_amount(*amount), total_share.to_string()])
            .collect(),
    })
}

/// Lays out the report for `ledger` as of `generated_at`.
#[must_use]
pub fn build_report(ledger: &Ledger, generated_at: DateTime<Utc>) -> Report {
    let total_share = ledger.total_share();
    let mut sections = Vec::with_capacity(3);

    let provisions: Vec<_> = ledger
        .provisions
        .iter()
        .map(|p| (p.label.clone(), p.amount))
        .collect();
    sections.extend(entry_section("Provisions de Charges", &provisions, total_share));

    let bills: Vec<_> = ledger
        .bills
        .iter()
        .map(|b| (b.label.clone(), b.amount))
        .collect();
    sections.extend(entry_section("Travaux et Charges", &bills, total_share));

    let balances = ledger.balances();
    if !balances.is_empty() {
        sections.push(Section {
            heading: "Coproprietaires".to_string(),
            columns: columns(&[("Nom", 60), ("Tantiemes", 40), ("Part (%)", 40), ("Solde", 40)]),
            rows: balances
                .into_iter()
                .map(|b| {
                    vec![
                        b.name,
                        b.share.to_string(),
                        format!("{:.2}%", b.share_percent.round_dp(2)),
                        format_amount(b.net),
                    ]
                })
                .collect(),
        });
    }

    Report {
        title: REPORT_TITLE.to_string(),
        date_line: format!("Date: {}", generated_at.format("%d/%m/%Y")),
        sections,
        global_balance: ("Solde Global".to_string(), format_amount(ledger.global_balance())),
        footer: format!(
            "Document genere automatiquement par Tanzia le {}",
            generated_at.format("%d/%m/%Y %H:%M")
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::balance::{Bill, Person, Provision};

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 0).unwrap()
    }

    fn ledger() -> Ledger {
        Ledger::new(
            vec![Person::new("Alice", 1), Person::new("Bob", 2)],
            vec![Bill::new("Toiture", dec!(300))],
            vec![
                Provision::new("T1", dec!(150)),
                Provision::new("T2", dec!(100.5)),
            ],
        )
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(1234.5)), "1234.50 EUR");
        assert_eq!(format_amount(dec!(-100)), "-100.00 EUR");
        assert_eq!(format_amount(dec!(33.333333)), "33.33 EUR");
    }

    #[test]
    fn test_report_filename() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(report_filename(date), "tanzia-rapport-2025-03-07.pdf");
    }

    #[test]
    fn test_report_layout() {
        let report = build_report(&ledger(), generated_at());

        assert_eq!(report.title, REPORT_TITLE);
        assert_eq!(report.date_line, "Date: 07/03/2025");
        assert_eq!(report.footer, "Document genere automatiquement par Tanzia le 07/03/2025 14:05");

        let headings: Vec<_> = report.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, ["Provisions de Charges", "Travaux et Charges", "Coproprietaires"]);

        assert_eq!(report.sections[0].rows[1], ["T2", "100.50 EUR", "3"]);
        assert_eq!(report.sections[1].rows[0], ["Toiture", "300.00 EUR", "3"]);
        assert_eq!(report.sections[2].rows[0], ["Alice", "1", "33.33%", "-16.50 EUR"]);
        assert_eq!(report.sections[2].rows[1], ["Bob", "2", "66.67%", "-33.00 EUR"]);

        assert_eq!(report.global_balance.1, "-49.50 EUR");
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let report = build_report(&Ledger::default(), generated_at());

        assert!(report.sections.is_empty());
        assert_eq!(report.global_balance.1, "0.00 EUR");
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render_pdf(&build_report(&ledger(), generated_at())).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_paginates_long_reports() {
        let bills = (0..200)
            .map(|i| Bill::new(format!("Facture {i}"), dec!(10)))
            .collect();
        let ledger = Ledger::new(vec![Person::new("Alice", 1)], bills, vec![]);

        let bytes = render_pdf(&build_report(&ledger, generated_at())).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }
}
