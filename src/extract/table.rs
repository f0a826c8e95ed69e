use tracing::debug;

use super::noise::{LineKind, NoiseFilter};
use super::row_parser::RowParser;
use crate::model::WaiverRecord;

pub const DEFAULT_LOOKAHEAD_LINES: usize = 4;
const HEADER_TOKEN: &str = "Reason";

/// Rebuilds table rows from the concatenated lines of every page.
pub struct TableScanner<'a> {
    pub parser: &'a RowParser,
    pub noise: &'a NoiseFilter,
    pub lookahead_lines: usize,
}

impl TableScanner<'_> {
    pub fn line_scan(&self, text: &str) -> Vec<WaiverRecord> {
        let lines = text.lines().collect::<Vec<&str>>();
        let body_start = lines
            .iter()
            .position(|line| line.contains(HEADER_TOKEN))
            .map(|index| index + 1)
            .unwrap_or(0);

        let mut records = Vec::<WaiverRecord>::new();
        let mut index = body_start;
        while index < lines.len() {
            let line = lines[index];
            if self.noise.is_skippable(line) || !self.has_identifier(line) {
                index += 1;
                continue;
            }

            let (stitched, next_index) = self.stitch_row(&lines, index);
            match self.parser.parse_line(&stitched) {
                Some(record) => records.push(record),
                None => debug!(line = index + 1, "discarded candidate row"),
            }
            index = next_index;
        }

        records
    }

    /// Splits the text after the last table keyword purely on identifier
    /// occurrences. Used when line boundaries cannot be trusted.
    pub fn segment_scan(&self, text: &str) -> Vec<WaiverRecord> {
        let patterns = &self.parser.patterns;
        let zone_start = patterns
            .table_keyword
            .find_iter(text)
            .last()
            .map(|found| found.end())
            .unwrap_or(0);
        let zone = &text[zone_start..];

        let spans = patterns.identifier_spans(zone);
        let mut records = Vec::<WaiverRecord>::new();
        for (position, (start, _)) in spans.iter().enumerate() {
            let end = spans
                .get(position + 1)
                .map(|(next_start, _)| *next_start)
                .unwrap_or(zone.len());
            let segment = self.clean_segment(&zone[*start..end]);
            match self.parser.parse_line(&segment) {
                Some(record) => records.push(record),
                None => debug!(offset = zone_start + start, "discarded candidate segment"),
            }
        }

        records
    }

    fn has_identifier(&self, line: &str) -> bool {
        self.parser.patterns.find_identifier(line).is_some()
    }

    /// Joins an identifier line with its continuation lines. Returns the row
    /// text and the index of the first line not consumed.
    fn stitch_row(&self, lines: &[&str], start: usize) -> (String, usize) {
        let mut parts = vec![lines[start].trim()];
        let mut accepted = 0usize;
        let mut cursor = start + 1;

        while cursor < lines.len() && accepted < self.lookahead_lines {
            let line = lines[cursor];
            match self.noise.classify(line) {
                LineKind::Blank | LineKind::Noise => {
                    cursor += 1;
                    continue;
                }
                LineKind::SignOff => break,
                LineKind::Content => {}
            }
            if self.has_identifier(line) {
                break;
            }

            parts.push(line.trim());
            accepted += 1;
            cursor += 1;
        }

        (parts.join(" "), cursor)
    }

    fn clean_segment(&self, segment: &str) -> String {
        segment
            .lines()
            .take_while(|line| self.noise.classify(line) != LineKind::SignOff)
            .filter(|line| !self.noise.is_skippable(line))
            .map(str::trim)
            .collect::<Vec<&str>>()
            .join(" ")
    }
}
