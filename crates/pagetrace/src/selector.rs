//! CSS-like selector construction from a composed dispatch path.

use crate::types::ElementDescriptor;

/// Build a selector for the first element of `path`, walking upward.
///
/// The walk stops at the first element bearing an id, emitted as `#id`, or
/// after `body`. Elements with classes contribute their first class as
/// `.class`; everything else contributes its bare tag name. Segments join
/// outermost-first with `>`.
pub fn selector_from_path(path: &[ElementDescriptor]) -> String {
    let mut segments = Vec::new();
    for el in path {
        let tag = el.tag.to_ascii_lowercase();
        if let Some(id) = el.id.as_deref().filter(|id| !id.is_empty()) {
            segments.push(format!("#{id}"));
            break;
        } else if let Some(class) = el.classes.first().filter(|c| !c.is_empty()) {
            segments.push(format!(".{class}"));
        } else {
            segments.push(tag.clone());
        }
        if tag == "body" {
            break;
        }
    }
    segments.reverse();
    segments.join(">")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementDescriptor as El;

    #[test]
    fn test_walk_terminates_at_body() {
        let path = vec![
            El::new("span"),
            El::new("a").with_class("nav-link"),
            El::new("div"),
            El::new("body"),
            El::new("html"),
        ];
        assert_eq!(selector_from_path(&path), "body>div>.nav-link>span");
    }

    #[test]
    fn test_id_stops_the_walk() {
        let path = vec![
            El::new("button").with_class("buy"),
            El::new("form").with_id("checkout"),
            El::new("main"),
            El::new("body"),
        ];
        assert_eq!(selector_from_path(&path), "#checkout>.buy");
    }

    #[test]
    fn test_id_on_target_itself() {
        let path = vec![El::new("a").with_id("logo"), El::new("body")];
        assert_eq!(selector_from_path(&path), "#logo");
    }

    #[test]
    fn test_first_class_wins() {
        let path = vec![
            El::new("li").with_class("item").with_class("active"),
            El::new("body"),
        ];
        assert_eq!(selector_from_path(&path), "body>.item");
    }

    #[test]
    fn test_tag_names_lowercased() {
        let path = vec![El::new("SPAN"), El::new("BODY")];
        assert_eq!(selector_from_path(&path), "body>span");
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(selector_from_path(&[]), "");
    }
}
