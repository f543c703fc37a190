//! Line-oriented data (word lists, vocabularies, CSV): size plus samples
//! from the start, middle and end.

use super::excerpt_line;

pub(super) fn condense(text: &str, sample: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let total = lines.len();

    let mut out = format!("[Line-oriented data: {} entries, {} bytes]\n", total, text.len());

    push_sample(&mut out, "First".to_string(), &lines, 0, sample);

    let middle = (total / 2).saturating_sub(sample / 2);
    push_sample(
        &mut out,
        format!("Middle (from line {})", middle + 1),
        &lines,
        middle,
        sample,
    );

    let tail = total.saturating_sub(sample);
    push_sample(&mut out, "Last".to_string(), &lines, tail, sample);

    out
}

fn push_sample(out: &mut String, label: String, lines: &[&str], start: usize, sample: usize) {
    let end = (start + sample).min(lines.len());
    out.push_str(&format!("\n{} {} entries:\n", label, end.saturating_sub(start)));
    for line in &lines[start.min(end)..end] {
        out.push_str(&excerpt_line(line));
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::super::truncate_content;
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{i:05}\n")).collect()
    }

    #[test]
    fn test_three_labelled_samples() {
        let text = words(1_000);
        let out = truncate_content(&text, "vocab.txt", 500);

        assert!(out.starts_with(&format!("[Line-oriented data: 1000 entries, {} bytes]\n", text.len())));
        assert!(out.contains("\nFirst 10 entries:\nword00000\n"));
        assert!(out.contains("word00009\n"));
        assert!(!out.contains("word00010\n"));

        // 1000 / 2 - 5 = 495, reported 1-based
        assert!(out.contains("\nMiddle (from line 496) 10 entries:\nword00495\n"));
        assert!(out.contains("word00504\n"));

        assert!(out.contains("\nLast 10 entries:\nword00990\n"));
        assert!(out.ends_with("word00999\n"));
    }

    #[test]
    fn test_custom_sample_size() {
        let out = condense(&words(100), 3);
        assert!(out.contains("First 3 entries:\nword00000\nword00001\nword00002\n"));
        assert!(out.contains("Middle (from line 50) 3 entries:\nword00049\n"));
        assert!(out.contains("Last 3 entries:\nword00097\nword00098\nword00099\n"));
    }

    #[test]
    fn test_short_listing_does_not_panic() {
        let out = condense("a\nb\nc\n", 10);
        assert!(out.contains("First 3 entries:"));
        assert!(out.contains("Middle (from line 1) 3 entries:"));
        assert!(out.contains("Last 3 entries:"));

        let empty = condense("", 10);
        assert!(empty.starts_with("[Line-oriented data: 0 entries, 0 bytes]"));
    }

    #[test]
    fn test_csv_uses_samples() {
        let mut csv = String::from("id,name\n");
        for i in 0..500 {
            csv.push_str(&format!("{i},row{i}\n"));
        }
        let out = truncate_content(&csv, "table.csv", 200);
        assert!(out.contains("First 10 entries:\nid,name\n"));
        assert!(out.contains("Last 10 entries:"));
    }
}
