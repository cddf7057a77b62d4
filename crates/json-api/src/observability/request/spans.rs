//! HTTP span helpers.

use uuid::Uuid;

/// Collapse identifier segments so spans and metrics share one label per route.
pub(super) fn route_template(path: &str) -> String {
    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                "{uuid}"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_path_is_kept() {
        assert_eq!(route_template("/"), "/");
    }

    #[test]
    fn uuid_segments_are_replaced() {
        let path = format!("/admin/orders/{}/status", Uuid::nil());

        assert_eq!(route_template(&path), "/admin/orders/{uuid}/status");
    }

    #[test]
    fn plain_segments_are_untouched() {
        assert_eq!(route_template("/cart/items/"), "/cart/items");
    }
}
