use std::cmp::Ordering;

const SORT_PAD_WIDTH: usize = 3;

pub fn composite_key(chapter: u32, verse: u32, delimiter: &str) -> String {
    format!("{chapter}{delimiter}{verse}")
}

pub fn sort_key(id: &str, delimiter: &str) -> String {
    if delimiter.is_empty() {
        return pad_segment(id);
    }

    id.split(delimiter)
        .map(pad_segment)
        .collect::<Vec<String>>()
        .join(delimiter)
}

pub fn compare_ids(a: &str, b: &str, delimiter: &str) -> Ordering {
    sort_key(a, delimiter)
        .cmp(&sort_key(b, delimiter))
        .then_with(|| a.cmp(b))
}

fn pad_segment(segment: &str) -> String {
    if !segment.is_empty() && segment.chars().all(|ch| ch.is_ascii_digit()) {
        format!("{:0>width$}", segment, width = SORT_PAD_WIDTH)
    } else {
        segment.to_string()
    }
}
