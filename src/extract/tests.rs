use super::*;
use crate::model::REASON_NOT_SPECIFIED;

fn extractor() -> Extractor {
    Extractor::new(ExtractionConfig::default()).expect("extractor builds")
}

fn text_document(pages: &[&str]) -> PreparedDocument {
    extractor().prepare(ExtractionInput::Text(
        pages.iter().map(|page| page.to_string()).collect(),
    ))
}

const SINGLE_PAGE: &str = "\
From: Collections Head <collections.head@outlook.com>
Sent: 2024-03-05 10:15
Subject: Waiver request
Please find the waiver details below.
Sr No Agreement Number Penal Charge Bounce Charge Total Amount Reason
1 AB123456 1,200 350 1,550 Bank side issue
2 CD654321 500 250 750 Signature missing at
branch level
Approved.
Regards,
Collections Desk";

#[test]
fn line_scan_reconstructs_rows_with_continuations() {
    let extractor = extractor();
    let document = text_document(&[SINGLE_PAGE]);
    let extraction = extractor.extract_records(&document);

    assert_eq!(extraction.strategy, Some("line_scan"));
    assert_eq!(extraction.records.len(), 2);
    assert_eq!(extraction.records[0].agreement_id, "AB123456");
    assert_eq!(extraction.records[0].reason, "Bank side issue");
    assert_eq!(extraction.records[1].agreement_id, "CD654321");
    assert_eq!(extraction.records[1].total_waived, "750");
    assert_eq!(
        extraction.records[1].reason,
        "Signature missing at branch level Approved."
    );
}

#[test]
fn page_break_artifacts_do_not_split_the_reason() {
    let joined = "Agreement Number Penal Charge Bounce Charge Total Amount Reason\nAB123456 100 200 300 Bank side issue raised\nRegards";
    let split_first = "Agreement Number Penal Charge Bounce Charge Total Amount Reason\nAB123456 100 200 300 Bank side\nPage 1/2\nhttps://outlook.office.com/mail/inbox/id/AAQk";
    let split_second = "3/5/24, 9:41 AM\nMail - Collections Desk - Outlook\nAgreement Number Penal Charge Bounce Charge Total Amount Reason\n\nissue raised\nRegards";

    let extractor = extractor();
    let whole = extractor.extract_records(&text_document(&[joined]));
    let paged = extractor.extract_records(&text_document(&[split_first, split_second]));

    assert_eq!(whole.records.len(), 1);
    assert_eq!(whole.records, paged.records);
    assert_eq!(paged.records[0].reason, "Bank side issue raised");
}

#[test]
fn lookahead_stops_at_the_next_identifier_and_window_size() {
    let text = "Reason\nAB123456 1 2 3 first\nline two\nline three\nline four\nline five\nline six\nCD654321 4 5 6 second";
    let extraction = extractor().extract_records(&text_document(&[text]));

    assert_eq!(extraction.records.len(), 2);
    assert_eq!(
        extraction.records[0].reason,
        "first line two line three line four line five"
    );
    assert_eq!(extraction.records[1].reason, "second");
}

#[test]
fn rows_without_three_amounts_are_dropped() {
    let text = "Reason\nAB123456 100 200 pending\nCD654321 5 6 7 Customer request";
    let extraction = extractor().extract_records(&text_document(&[text]));

    assert_eq!(extraction.records.len(), 1);
    assert_eq!(extraction.records[0].agreement_id, "CD654321");
}

#[test]
fn segment_scan_runs_when_line_scan_finds_nothing() {
    let text = "Agreement Number Penal Charge Bounce Charge Total Amount Reason AB123456 100 200 300 Bank side issue CD654321 50 60 110 Customer request";
    let extraction = extractor().extract_records(&text_document(&[text]));

    assert_eq!(extraction.attempted, vec!["line_scan", "segment_scan"]);
    assert_eq!(extraction.strategy, Some("segment_scan"));
    assert_eq!(extraction.records.len(), 2);
    assert_eq!(extraction.records[0].reason, "Bank side issue");
    assert_eq!(extraction.records[1].agreement_id, "CD654321");
    assert_eq!(extraction.records[1].reason, "Customer request");
}

#[test]
fn empty_line_scan_still_attempts_segment_scan() {
    let extraction = extractor().extract_records(&text_document(&["Reason\nnothing here"]));

    assert!(extraction.records.is_empty());
    assert_eq!(extraction.attempted, vec!["line_scan", "segment_scan"]);
    assert_eq!(extraction.strategy, Some("segment_scan"));
}

#[test]
fn missing_header_scans_from_the_first_line() {
    let text = "AB123456 100 200 300 System error\nCD654321 1 2 3";
    let extraction = extractor().extract_records(&text_document(&[text]));

    assert_eq!(extraction.records.len(), 2);
    assert_eq!(extraction.records[0].reason, "System error");
    assert_eq!(extraction.records[1].reason, REASON_NOT_SPECIFIED);
}

#[test]
fn duplicate_rows_across_pages_collapse() {
    let page = "Reason\nAB123456 100 200 300 Bank side issue";
    let extraction = extractor().extract_records(&text_document(&[page, page]));

    assert_eq!(extraction.records.len(), 1);
}

#[test]
fn token_input_uses_grouped_rows() {
    let extractor = extractor();
    let pages = vec![vec![
        Token::new(50.0, 40.0, "From: approver@outlook.com"),
        Token::new(900.0, 500.0, "300"),
        Token::new(100.0, 505.0, "AB123456"),
        Token::new(500.0, 498.0, "100"),
        Token::new(700.0, 502.0, "200"),
        Token::new(1200.0, 510.0, "Customer request"),
        Token::new(100.0, 800.0, "CD654321"),
        Token::new(500.0, 800.0, "50"),
    ]];

    let document = extractor.prepare(ExtractionInput::Tokens(pages));
    let extraction = extractor.extract_records(&document);

    assert_eq!(extraction.strategy, Some("token_rows"));
    assert_eq!(extraction.records.len(), 1);
    assert_eq!(extraction.records[0].penal_charge, "100");
    assert_eq!(extraction.records[0].bounce_charge, "200");
    assert_eq!(extraction.records[0].total_waived, "300");
    assert_eq!(extraction.records[0].reason, "Customer request");

    let metadata = extractor.extract_metadata(&document);
    assert_eq!(
        metadata.approver_email.as_deref(),
        Some("approver@outlook.com")
    );
}

#[test]
fn token_rows_fall_back_to_line_scan_for_wrapped_reasons() {
    let extractor = extractor();
    let pages = vec![vec![
        Token::new(100.0, 100.0, "AB123456"),
        Token::new(300.0, 100.0, "100"),
        Token::new(500.0, 100.0, "200"),
        Token::new(100.0, 400.0, "300"),
        Token::new(300.0, 400.0, "Signature mismatch"),
    ]];

    let document = extractor.prepare(ExtractionInput::Tokens(pages));
    let extraction = extractor.extract_records(&document);

    assert_eq!(extraction.attempted, vec!["token_rows", "line_scan"]);
    assert_eq!(extraction.records.len(), 1);
    assert_eq!(extraction.records[0].total_waived, "300");
    assert_eq!(extraction.records[0].reason, "Signature mismatch");
}

#[test]
fn repeated_runs_are_deterministic() {
    let extractor = extractor();
    let document = text_document(&[SINGLE_PAGE]);
    let first = extractor.extract_records(&document);
    for _ in 0..5 {
        assert_eq!(extractor.extract_records(&document), first);
    }
}

#[test]
fn emitted_identifiers_match_the_identifier_pattern() {
    let extractor = extractor();
    let extraction = extractor.extract_records(&text_document(&[SINGLE_PAGE]));
    for record in &extraction.records {
        assert!(extractor.patterns().is_identifier(&record.agreement_id));
    }
}

#[test]
fn one_cell_per_line_rows_keep_small_amounts() {
    let text = "Agreement Number Penal Charge Bounce Charge Total Amount\nReason\nAB123456\n100\n200\n300\nBank side issue";
    let extraction = extractor().extract_records(&text_document(&[text]));

    assert_eq!(extraction.strategy, Some("line_scan"));
    assert_eq!(extraction.records.len(), 1);
    assert_eq!(extraction.records[0].penal_charge, "100");
    assert_eq!(extraction.records[0].bounce_charge, "200");
    assert_eq!(extraction.records[0].total_waived, "300");
    assert_eq!(extraction.records[0].reason, "Bank side issue");
}

#[test]
fn segment_scan_keeps_small_amounts_on_their_own_lines() {
    let text = "Penal Charge Bounce Charge Total Amount Reason AB123456\n12\n5\n17\nSystem error";
    let extraction = extractor().extract_records(&text_document(&[text]));

    assert_eq!(extraction.strategy, Some("segment_scan"));
    assert_eq!(extraction.records.len(), 1);
    assert_eq!(extraction.records[0].penal_charge, "12");
    assert_eq!(extraction.records[0].bounce_charge, "5");
    assert_eq!(extraction.records[0].total_waived, "17");
    assert_eq!(extraction.records[0].reason, "System error");
}

#[test]
fn rows_mentioning_a_link_are_kept() {
    let text = "Reason\nAB123456 100 200 300 Refer www.bank.example/policy for waiver";
    let extraction = extractor().extract_records(&text_document(&[text]));

    assert_eq!(extraction.strategy, Some("line_scan"));
    assert_eq!(extraction.records.len(), 1);
    assert_eq!(
        extraction.records[0].reason,
        "Refer www.bank.example/policy for waiver"
    );
}
