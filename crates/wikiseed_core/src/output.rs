use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Persist the collected titles as a one-field-per-row CSV file, fully
/// overwriting any previous output. Row order is the iteration order of the
/// input, which for the driver's `BTreeSet` is lexicographic.
pub fn write_seed_file<'a, I>(path: &Path, titles: I) -> Result<()>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut body = String::new();
    for title in titles {
        body.push_str(&csv_field(title));
        body.push('\n');
    }
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

/// A field containing a comma, quote, or line break is quoted with inner
/// quotes doubled; anything else passes through bare. Article titles with
/// commas are common enough that this cannot be skipped.
fn csv_field(value: &str) -> String {
    if !value.contains([',', '"', '\n', '\r']) {
        return value.to_string();
    }
    let mut output = String::with_capacity(value.len() + 2);
    output.push('"');
    for ch in value.chars() {
        if ch == '"' {
            output.push('"');
        }
        output.push(ch);
    }
    output.push('"');
    output
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;

    use tempfile::tempdir;

    use super::{csv_field, write_seed_file};

    #[test]
    fn writes_sorted_titles_one_per_line() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("wiki_seeds.csv");

        let titles = ["Banana", "apple", "Cherry"]
            .into_iter()
            .map(ToString::to_string)
            .collect::<BTreeSet<_>>();
        write_seed_file(&path, &titles).expect("write");

        let content = fs::read_to_string(&path).expect("read");
        assert_eq!(content, "Banana\nCherry\napple\n");
    }

    #[test]
    fn overwrites_previous_output() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("wiki_seeds.csv");
        fs::write(&path, "stale line one\nstale line two\n").expect("seed stale file");

        let titles = BTreeSet::from(["Earth".to_string()]);
        write_seed_file(&path, &titles).expect("write");

        assert_eq!(fs::read_to_string(&path).expect("read"), "Earth\n");
    }

    #[test]
    fn comma_bearing_titles_are_quoted() {
        assert_eq!(csv_field("Hello, Dolly!"), "\"Hello, Dolly!\"");
        assert_eq!(csv_field("Earth"), "Earth");
        assert_eq!(csv_field("A \"quoted\" title"), "\"A \"\"quoted\"\" title\"");
    }
}
