pub mod pdf;
pub mod split;

/// Ordered per-page text joined with no separator between pages.
pub fn concat_pages(pages: impl IntoIterator<Item = String>) -> String {
    let mut text = String::new();
    for page in pages {
        text += &page;
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_concatenate_without_separator() {
        let pages = vec!["A.".to_string(), "B.".to_string(), "C.".to_string()];
        assert_eq!(concat_pages(pages), "A.B.C.");
    }

    #[test]
    fn empty_pages_contribute_nothing() {
        let pages = vec!["A.".to_string(), String::new(), "C.".to_string()];
        assert_eq!(concat_pages(pages), "A.C.");
    }

    #[test]
    fn no_pages_yields_empty_text() {
        assert_eq!(concat_pages(Vec::<String>::new()), "");
    }
}
