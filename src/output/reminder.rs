//! Reminder message formatting

use crate::assignment::Assignment;

/// Longest text a single push message may carry (characters)
pub const PUSH_TEXT_LIMIT: usize = 5000;

/// Description characters shown before truncation
pub const PREVIEW_CHARS: usize = 80;

/// Message sent when nothing falls inside the window
pub const NOTHING_DUE: &str = "締切が近い課題はありません。";

/// Makes an assignment URL absolute against the portal base URL
pub fn absolute_url(url: &str, base_url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

/// Formats one assignment as a short block of lines
///
/// # Arguments
///
/// * `assignment` - The assignment to render
/// * `base_url` - Portal base URL, used for relative assignment links
///
/// # Returns
///
/// Title, course, deadline, link and description preview, one per line;
/// missing deadline, link and preview lines are omitted.
pub fn format_assignment(assignment: &Assignment, base_url: &str) -> String {
    let mut lines = vec![
        format!("・{}", assignment.title()),
        format!("  コース: {}", assignment.course_name()),
    ];

    if let Some(due) = assignment.due_date() {
        lines.push(format!("  締切: {}", due.format("%Y-%m-%d %H:%M")));
    }
    if !assignment.url().is_empty() {
        lines.push(format!("  {}", absolute_url(assignment.url(), base_url)));
    }

    let description = assignment.description_preview();
    if !description.is_empty() {
        let mut preview: String = description
            .chars()
            .take(PREVIEW_CHARS)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        if description.chars().count() > PREVIEW_CHARS {
            preview.push_str("...");
        }
        lines.push(format!("  {}", preview));
    }

    lines.join("\n")
}

/// Formats the reminder for a list of assignments due within `days`
pub fn format_reminder_message(assignments: &[Assignment], days: u32, base_url: &str) -> String {
    if assignments.is_empty() {
        return NOTHING_DUE.to_string();
    }

    let mut message = format!("【Moodle リマインド】締切 {} 日以内の課題\n", days);
    for assignment in assignments {
        message.push('\n');
        message.push_str(&format_assignment(assignment, base_url));
        message.push('\n');
    }

    message.trim().to_string()
}

/// Splits text into chunks of at most `limit` characters
///
/// Chunks break between lines. A single line longer than `limit` is cut at
/// character boundaries.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_len = 0;

    for line in text.split('\n') {
        for piece in line_pieces(line, limit) {
            let piece_len = piece.chars().count();
            if chunk_len > 0 && chunk_len + 1 + piece_len > limit {
                chunks.push(std::mem::take(&mut chunk));
                chunk_len = 0;
            }
            if chunk_len > 0 {
                chunk.push('\n');
                chunk_len += 1;
            }
            chunk.push_str(&piece);
            chunk_len += piece_len;
        }
    }

    if !chunk.trim().is_empty() {
        chunks.push(chunk.trim_end().to_string());
    }

    chunks
}

fn line_pieces(line: &str, limit: usize) -> Vec<String> {
    if line.chars().count() <= limit {
        return vec![line.to_string()];
    }

    let chars: Vec<char> = line.chars().collect();
    chars.chunks(limit).map(|c| c.iter().collect()).collect()
}
