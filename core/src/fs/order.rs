use std::cmp::Ordering;

/// Compare names so that digit runs order by value: `page2` sorts before `page10`.
///
/// Comparison is case-insensitive; equal keys fall back to a plain byte comparison so the
/// order stays total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (lower_a, lower_b) = (a.to_lowercase(), b.to_lowercase());
    let mut left = Chunks { rest: &lower_a };
    let mut right = Chunks { rest: &lower_b };

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (is_number(x), is_number(y)) {
                    (true, true) => cmp_digits(x, y),
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn is_number(chunk: &str) -> bool {
    chunk.starts_with(|ch: char| ch.is_ascii_digit())
}

/// Numeric comparison of two digit runs of any length; more leading zeros sort later.
fn cmp_digits(x: &str, y: &str) -> Ordering {
    let trimmed_x = x.trim_start_matches('0');
    let trimmed_y = y.trim_start_matches('0');
    trimmed_x
        .len()
        .cmp(&trimmed_y.len())
        .then_with(|| trimmed_x.cmp(trimmed_y))
        .then_with(|| x.len().cmp(&y.len()))
}

/// Splits a string into alternating digit and non-digit runs.
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .find(|ch: char| ch.is_ascii_digit() != digits)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}
