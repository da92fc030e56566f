use crate::core::types::ComponentId;

/// Default name for a new component of `kind`: `"<Kind> <n>"`.
///
/// `n` starts one past the number of components of that kind already present
/// and moves forward until the name is free.
pub fn default_name(kind: &str, existing: &[ComponentId]) -> String {
    let mut n = existing.iter().filter(|id| id.module_type() == kind).count() + 1;
    loop {
        let candidate = format!("{} {}", kind, n);
        if !is_taken(&candidate, existing) {
            return candidate;
        }
        n += 1;
    }
}

pub fn is_taken(name: &str, existing: &[ComponentId]) -> bool {
    existing.iter().any(|id| id.id() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_per_kind() {
        let existing = vec![
            ComponentId::new("Network 1", "Network"),
            ComponentId::new("World 1", "World"),
        ];
        assert_eq!(default_name("Network", &existing), "Network 2");
        assert_eq!(default_name("Plot", &existing), "Plot 1");
    }

    #[test]
    fn test_skips_taken_names() {
        // A removed "Network 1" leaves "Network 2" as the only network
        let existing = vec![ComponentId::new("Network 2", "Network")];
        assert_eq!(default_name("Network", &existing), "Network 3");
    }
}
