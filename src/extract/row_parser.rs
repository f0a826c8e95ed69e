use anyhow::Result;
use tracing::debug;

use super::reason::{ReasonNormalizer, detect_known_reason};
use crate::model::{REASON_NOT_SPECIFIED, WaiverRecord};
use crate::patterns::Patterns;

const CHARGE_FIELD_COUNT: usize = 3;

pub struct RowParser {
    pub patterns: Patterns,
    reasons: ReasonNormalizer,
}

impl RowParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: Patterns::new()?,
            reasons: ReasonNormalizer::new()?,
        })
    }

    /// Parses one OCR row. The reason is every non-numeric word of the row.
    pub fn parse_tokens(&self, texts: &[&str]) -> Option<WaiverRecord> {
        let words = texts
            .iter()
            .flat_map(|text| text.split_whitespace())
            .collect::<Vec<&str>>();

        let id_index = words
            .iter()
            .position(|word| self.patterns.is_identifier(word))?;

        let amounts = words[id_index + 1..]
            .iter()
            .map(|word| amount_candidate(word))
            .filter(|word| self.patterns.is_amount(word))
            .take(CHARGE_FIELD_COUNT)
            .collect::<Vec<&str>>();
        if amounts.len() < CHARGE_FIELD_COUNT {
            debug!(
                agreement_id = words[id_index],
                amounts = amounts.len(),
                "dropping token row with too few charge fields"
            );
            return None;
        }

        let reason_words = words
            .iter()
            .enumerate()
            .filter(|(index, word)| {
                *index != id_index
                    && !self.patterns.is_amount(amount_candidate(word))
                    && !is_separator_word(word)
            })
            .map(|(_, word)| *word)
            .collect::<Vec<&str>>();

        Some(self.build_record(
            words[id_index],
            &amounts,
            &reason_words.join(" "),
            &words.join(" "),
        ))
    }

    /// Parses a stitched text row. The reason is whatever follows the third
    /// charge amount after the identifier.
    pub fn parse_line(&self, line: &str) -> Option<WaiverRecord> {
        let (id_start, id_end) = self.patterns.find_identifier(line)?;
        let agreement_id = &line[id_start..id_end];
        let tail = &line[id_end..];

        let amounts = self
            .patterns
            .amount
            .find_iter(tail)
            .take(CHARGE_FIELD_COUNT)
            .collect::<Vec<_>>();
        if amounts.len() < CHARGE_FIELD_COUNT {
            debug!(
                agreement_id,
                amounts = amounts.len(),
                "dropping text row with too few charge fields"
            );
            return None;
        }

        let reason_raw = &tail[amounts[CHARGE_FIELD_COUNT - 1].end()..];
        let charges = amounts.iter().map(|found| found.as_str()).collect::<Vec<&str>>();

        Some(self.build_record(agreement_id, &charges, reason_raw, line))
    }

    fn build_record(
        &self,
        agreement_id: &str,
        charges: &[&str],
        reason_raw: &str,
        row_text: &str,
    ) -> WaiverRecord {
        let reason = self
            .reasons
            .normalize(reason_raw)
            .or_else(|| detect_known_reason(row_text))
            .unwrap_or_else(|| REASON_NOT_SPECIFIED.to_string());

        WaiverRecord {
            agreement_id: agreement_id.to_string(),
            penal_charge: charges[0].to_string(),
            bounce_charge: charges[1].to_string(),
            total_waived: charges[2].to_string(),
            reason,
        }
    }
}

fn amount_candidate(word: &str) -> &str {
    let word = word.strip_suffix("/-").unwrap_or(word);
    word.trim_matches(['|', ',', ';', ':', '(', ')'])
}

fn is_separator_word(word: &str) -> bool {
    word.chars()
        .all(|character| matches!(character, '|' | '-' | '–' | '—' | ':' | ','))
}
