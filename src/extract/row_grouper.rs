use std::cmp::Ordering;

use crate::model::Token;

pub const DEFAULT_ROW_THRESHOLD: f64 = 100.0;

/// Groups one page of tokens into rows by vertical proximity.
///
/// Tokens are visited in ascending `y`. A token joins the current row when its
/// `y` lies within `threshold` of the last token appended to that row; the
/// reference therefore follows the row as it drifts rather than staying at the
/// row's mean. Each finished row is reordered by `x`.
pub fn group_rows(tokens: &[Token], threshold: f64) -> Vec<Vec<Token>> {
    let mut ordered = tokens.to_vec();
    ordered.sort_by(|left, right| left.y.partial_cmp(&right.y).unwrap_or(Ordering::Equal));

    let mut rows = Vec::<Vec<Token>>::new();
    let mut current = Vec::<Token>::new();
    let mut reference_y: Option<f64> = None;

    for token in ordered {
        if let Some(previous) = reference_y
            && (token.y - previous).abs() > threshold
        {
            rows.push(std::mem::take(&mut current));
        }
        reference_y = Some(token.y);
        current.push(token);
    }

    if !current.is_empty() {
        rows.push(current);
    }

    for row in &mut rows {
        row.sort_by(|left, right| left.x.partial_cmp(&right.x).unwrap_or(Ordering::Equal));
    }

    rows
}

pub fn row_texts(row: &[Token]) -> Vec<&str> {
    row.iter()
        .map(|token| token.text.trim())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Renders grouped rows as text lines, one line per row.
pub fn rows_to_text(rows: &[Vec<Token>]) -> String {
    rows.iter()
        .map(|row| row_texts(row).join(" "))
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(rows: &[Vec<Token>]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|token| token.text.clone()).collect())
            .collect()
    }

    #[test]
    fn groups_tokens_into_rows_and_orders_by_x() {
        let tokens = vec![
            Token::new(400.0, 1010.0, "500"),
            Token::new(100.0, 1000.0, "AB123456"),
            Token::new(100.0, 1400.0, "CD654321"),
            Token::new(900.0, 1020.0, "Customer request"),
            Token::new(400.0, 1405.0, "700"),
        ];

        let rows = group_rows(&tokens, DEFAULT_ROW_THRESHOLD);
        assert_eq!(
            texts(&rows),
            vec![
                vec!["AB123456", "500", "Customer request"],
                vec!["CD654321", "700"],
            ]
        );
    }

    #[test]
    fn stray_token_becomes_its_own_row() {
        let tokens = vec![
            Token::new(10.0, 0.0, "Header"),
            Token::new(10.0, 500.0, "Page 2/3"),
            Token::new(10.0, 1000.0, "Footer"),
        ];

        let rows = group_rows(&tokens, DEFAULT_ROW_THRESHOLD);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].len(), 1);
        assert_eq!(rows[1][0].text, "Page 2/3");
    }

    #[test]
    fn reference_follows_last_token_and_drifts() {
        let tokens = vec![
            Token::new(0.0, 0.0, "a"),
            Token::new(0.0, 90.0, "b"),
            Token::new(0.0, 180.0, "c"),
            Token::new(0.0, 270.0, "d"),
        ];

        let rows = group_rows(&tokens, DEFAULT_ROW_THRESHOLD);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 4);
    }

    #[test]
    fn distance_equal_to_threshold_stays_in_row() {
        let tokens = vec![Token::new(0.0, 0.0, "a"), Token::new(0.0, 100.0, "b")];
        assert_eq!(group_rows(&tokens, 100.0).len(), 1);

        let tokens = vec![Token::new(0.0, 0.0, "a"), Token::new(0.0, 100.5, "b")];
        assert_eq!(group_rows(&tokens, 100.0).len(), 2);
    }

    #[test]
    fn empty_page_has_no_rows() {
        assert!(group_rows(&[], DEFAULT_ROW_THRESHOLD).is_empty());
    }

    #[test]
    fn rows_to_text_joins_tokens_and_rows() {
        let rows = vec![
            vec![Token::new(0.0, 0.0, "AB123456"), Token::new(1.0, 0.0, " 500 ")],
            vec![Token::new(0.0, 200.0, "Regards")],
        ];
        assert_eq!(rows_to_text(&rows), "AB123456 500\nRegards");
    }
}
