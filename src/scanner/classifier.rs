use crate::catalog::{Category, Declaration};

/// Maps a declaration's access markers to its bucket. Deterministic and
/// total over the three scan-derived categories; scheduled entries are
/// built from the task registry and never pass through here.
pub fn classify(declaration: &Declaration) -> Category {
    match (declaration.is_invocable, declaration.allows_anonymous) {
        (false, _) => Category::Resource,
        (true, true) => Category::Public,
        (true, false) => Category::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(is_invocable: bool, allows_anonymous: bool) -> Declaration {
        Declaration::new("f", "app.mod.f").with_access(is_invocable, allows_anonymous)
    }

    #[test]
    fn test_invocable_anonymous_is_public() {
        assert_eq!(classify(&declaration(true, true)), Category::Public);
    }

    #[test]
    fn test_invocable_authenticated_is_internal() {
        assert_eq!(classify(&declaration(true, false)), Category::Internal);
    }

    #[test]
    fn test_not_invocable_is_resource() {
        assert_eq!(classify(&declaration(false, false)), Category::Resource);
        // anonymous flag is irrelevant without invocability
        assert_eq!(classify(&declaration(false, true)), Category::Resource);
    }

    #[test]
    fn test_classification_is_exhaustive_and_disjoint() {
        let mut seen = std::collections::HashSet::new();
        for invocable in [false, true] {
            for anonymous in [false, true] {
                seen.insert(classify(&declaration(invocable, anonymous)));
            }
        }
        assert_eq!(
            seen,
            [Category::Public, Category::Internal, Category::Resource]
                .into_iter()
                .collect()
        );
    }
}
