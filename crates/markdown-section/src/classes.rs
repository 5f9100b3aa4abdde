/// Class options applied to every rendered `<section>`.
///
/// Tokens are emitted in field order: `section-h{level}`, `h{level}`,
/// `{prefix}h{level}`, then the custom class verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionOptions {
    pub section_class: bool,
    pub heading_class: bool,
    pub custom_class_prefix: String,
    pub custom_class: String,
}

impl Default for SectionOptions {
    fn default() -> Self {
        Self {
            section_class: true,
            heading_class: false,
            custom_class_prefix: String::new(),
            custom_class: String::new(),
        }
    }
}

impl SectionOptions {
    pub fn with_section_class(mut self, enabled: bool) -> Self {
        self.section_class = enabled;
        self
    }

    pub fn with_heading_class(mut self, enabled: bool) -> Self {
        self.heading_class = enabled;
        self
    }

    pub fn with_custom_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.custom_class_prefix = prefix.into();
        self
    }

    pub fn with_custom_class(mut self, class: impl Into<String>) -> Self {
        self.custom_class = class.into();
        self
    }

    pub fn classes_for(&self, level: usize) -> String {
        compute_classes(level, self)
    }
}

/// Computes the space separated class list for a section at `level`.
///
/// Returns an empty string when every option is disabled.
pub fn compute_classes(level: usize, options: &SectionOptions) -> String {
    let mut tokens: Vec<String> = Vec::with_capacity(4);

    if options.section_class {
        tokens.push(format!("section-h{level}"));
    }
    if options.heading_class {
        tokens.push(format!("h{level}"));
    }
    if !options.custom_class_prefix.is_empty() {
        tokens.push(format!("{}h{level}", options.custom_class_prefix));
    }
    if !options.custom_class.is_empty() {
        tokens.push(options.custom_class.clone());
    }

    tokens.join(" ").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_emit_section_class_only() {
        assert_eq!(compute_classes(2, &SectionOptions::default()), "section-h2");
    }

    #[test]
    fn all_disabled_is_empty() {
        let options = SectionOptions::default().with_section_class(false);
        assert_eq!(compute_classes(1, &options), "");
    }

    #[test]
    fn every_combination_keeps_declared_order() {
        for mask in 0u8..16 {
            let options = SectionOptions {
                section_class: mask & 1 != 0,
                heading_class: mask & 2 != 0,
                custom_class_prefix: if mask & 4 != 0 { "doc-".into() } else { String::new() },
                custom_class: if mask & 8 != 0 { "wrapped".into() } else { String::new() },
            };

            let mut expected = Vec::new();
            if options.section_class {
                expected.push("section-h3");
            }
            if options.heading_class {
                expected.push("h3");
            }
            if !options.custom_class_prefix.is_empty() {
                expected.push("doc-h3");
            }
            if !options.custom_class.is_empty() {
                expected.push("wrapped");
            }

            let classes = compute_classes(3, &options);
            assert_eq!(classes, expected.join(" "), "mask {mask:04b}");
            assert!(!classes.contains("  "));
            assert_eq!(classes, classes.trim());
        }
    }

    #[test]
    fn custom_class_is_verbatim_but_trimmed_at_the_edges() {
        let options = SectionOptions::default()
            .with_section_class(false)
            .with_custom_class(" card  wide ");
        assert_eq!(compute_classes(1, &options), "card  wide");
    }

    #[test]
    fn out_of_range_levels_are_formatted_numerically() {
        let options = SectionOptions::default().with_heading_class(true);
        assert_eq!(options.classes_for(9), "section-h9 h9");
    }
}
