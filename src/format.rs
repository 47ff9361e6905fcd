//! Formatting helpers shared by the table, the TUI and the print command

use std::cmp::Ordering;

use chrono::{Local, TimeZone};
use icu_collator::{Collator, CollatorOptions, Strength};

use crate::model::Action;

/// Shown when a timestamp is outside chrono's range
const INVALID_DATE: &str = "--/--/----";

/// Format a millisecond timestamp as `MM/DD/YYYY` in local time
pub fn format_date(timestamp_msec: i64) -> String {
    format_date_in(timestamp_msec, &Local)
}

/// Format a millisecond timestamp as `MM/DD/YYYY` in the given zone
pub fn format_date_in<Tz: TimeZone>(timestamp_msec: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(timestamp_msec).earliest() {
        Some(dt) => dt.format("%m/%d/%Y").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

thread_local! {
    static NAME_COLLATOR: Option<Collator> = name_collator();
}

/// Root-locale collator at secondary strength: accents count, case does not
fn name_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(e) => {
            log::warn!("collator unavailable, names compare by lowercase: {}", e);
            None
        }
    }
}

/// Locale-aware, case-insensitive name ordering
///
/// Names the collator considers equal fall back to a lowercase and then a
/// plain comparison so the result is total and deterministic.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    NAME_COLLATOR
        .with(|collator| collator.as_ref().map(|c| c.compare(a, b)))
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Find `needle` in `haystack` ignoring case.
///
/// Returns the byte range of the match in `haystack`.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return Some((0, 0));
    }
    for (start, _) in haystack.char_indices() {
        let mut rest = haystack[start..].char_indices();
        let mut end = start;
        let mut matched = true;
        for n in needle.chars() {
            match rest.next() {
                Some((offset, h)) if h.to_lowercase().eq(n.to_lowercase()) => {
                    end = start + offset + h.len_utf8();
                }
                _ => {
                    matched = false;
                    break;
                }
            }
        }
        if matched {
            return Some((start, end));
        }
    }
    None
}

/// Short form of a reason: whatever follows `<target><action>`.
///
/// The prefix spelling `<action><target>` is accepted when the postfix
/// one is absent. Returns `None` when neither is found or nothing but
/// whitespace follows.
pub fn short_reason(target: &str, action: &Action, reason_text: &str) -> Option<String> {
    let postfix = format!("{}{}", target, action.as_str());
    let prefix = format!("{}{}", action.as_str(), target);

    let (_, end) = find_ignore_case(reason_text, &postfix)
        .or_else(|| find_ignore_case(reason_text, &prefix))?;

    let rest = reason_text[end..].trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

/// Truncate to `max_len` characters with an ellipsis
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
