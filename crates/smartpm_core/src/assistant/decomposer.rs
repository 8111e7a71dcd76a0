//! Feature-description decomposition.
//!
//! # Responsibility
//! - Classify a description against the static domain table.
//! - Expand the chosen template into ordered task drafts.
//!
//! # Invariants
//! - Pure: same input, same output; no shared mutable state.
//! - Never returns an empty list.
//! - Callers reject blank input before calling (see `ConversationLog`).

use super::templates::{Domain, DOMAIN_TEMPLATES, FALLBACK_STEPS};
use crate::model::task::TaskDraft;
use log::debug;

/// Result of classifying one description.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub domain: Domain,
    pub drafts: Vec<TaskDraft>,
}

/// Returns the first domain whose keywords occur in the lower-cased input.
pub fn classify(description: &str) -> Domain {
    let lowered = description.to_lowercase();
    DOMAIN_TEMPLATES
        .iter()
        .find(|template| {
            template
                .keywords
                .iter()
                .any(|keyword| lowered.contains(keyword))
        })
        .map_or(Domain::Generic, |template| template.domain)
}

/// Expands a description into ordered drafts.
pub fn decompose(description: &str) -> Vec<TaskDraft> {
    decompose_with_domain(description).drafts
}

/// Same as [`decompose`], also reporting which template was used.
pub fn decompose_with_domain(description: &str) -> Decomposition {
    let domain = classify(description);
    let drafts = match DOMAIN_TEMPLATES
        .iter()
        .find(|template| template.domain == domain)
    {
        Some(template) => template
            .drafts
            .iter()
            .map(|entry| entry.to_draft())
            .collect::<Vec<_>>(),
        None => FALLBACK_STEPS
            .iter()
            .map(|step| step.render(description))
            .collect::<Vec<_>>(),
    };

    debug!(
        "event=decompose module=assistant status=ok domain={} input_chars={} drafts={}",
        domain.as_str(),
        description.chars().count(),
        drafts.len()
    );

    Decomposition { domain, drafts }
}

#[cfg(test)]
mod tests {
    use super::{classify, decompose, decompose_with_domain};
    use crate::assistant::templates::Domain;

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        assert_eq!(classify("Add OAuth provider"), Domain::Authentication);
        assert_eq!(classify("Online SHOPPING"), Domain::ECommerce);
        assert_eq!(classify("Happy path polish"), Domain::Mobile);
        assert_eq!(classify("Reporting pipeline"), Domain::Generic);
    }

    #[test]
    fn ecommerce_outranks_mobile() {
        assert_eq!(classify("shop app"), Domain::ECommerce);
    }

    #[test]
    fn fallback_keeps_original_casing() {
        let drafts = decompose("CSV Exporter");
        assert_eq!(drafts[0].task_name, "Research CSV Exporter");
        assert!(drafts[3]
            .description
            .as_deref()
            .unwrap_or("")
            .ends_with("CSV Exporter"));
    }

    #[test]
    fn reports_domain_alongside_drafts() {
        let result = decompose_with_domain("mobile checkout");
        assert_eq!(result.domain, Domain::Mobile);
        assert_eq!(result.drafts.len(), 4);
    }
}
