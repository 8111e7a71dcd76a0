//! Static domain template table.
//!
//! Domains are probed in table order and the first keyword hit wins. Every
//! priority, risk, hour and confidence value here is fixed data; only the
//! choice of template depends on the input text.

use crate::model::level::{Priority, RiskLevel};
use crate::model::task::TaskDraft;

/// Recognized feature domains plus the generic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Authentication,
    ECommerce,
    Mobile,
    Generic,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::ECommerce => "e-commerce",
            Self::Mobile => "mobile",
            Self::Generic => "generic",
        }
    }
}

/// One fixed draft entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraftTemplate {
    pub task_name: &'static str,
    pub description: &'static str,
    pub priority: Priority,
    pub risk_level: RiskLevel,
    pub estimated_hours: u32,
    pub confidence_score: f64,
}

impl DraftTemplate {
    pub(crate) fn to_draft(self) -> TaskDraft {
        TaskDraft {
            task_name: self.task_name.to_string(),
            description: Some(self.description.to_string()),
            priority: self.priority,
            risk_level: self.risk_level,
            estimated_hours: self.estimated_hours,
            confidence_score: self.confidence_score,
        }
    }
}

/// Keyword-triggered domain with its ordered draft list.
#[derive(Debug, Clone, Copy)]
pub struct DomainTemplate {
    pub domain: Domain,
    /// Lower-case substrings; any hit selects this domain.
    pub keywords: &'static [&'static str],
    pub drafts: &'static [DraftTemplate],
}

/// Fallback step whose name and description embed the user's text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackStep {
    /// Leading verb, rendered as `"<verb> <description>"`.
    pub verb: &'static str,
    /// Description prefix, rendered as `"<prefix> <description>"`.
    pub description_prefix: &'static str,
    pub priority: Priority,
    pub risk_level: RiskLevel,
    pub estimated_hours: u32,
    pub confidence_score: f64,
}

impl FallbackStep {
    pub(crate) fn render(&self, description: &str) -> TaskDraft {
        TaskDraft {
            task_name: format!("{} {}", self.verb, description),
            description: Some(format!("{} {}", self.description_prefix, description)),
            priority: self.priority,
            risk_level: self.risk_level,
            estimated_hours: self.estimated_hours,
            confidence_score: self.confidence_score,
        }
    }
}

const AUTHENTICATION_DRAFTS: &[DraftTemplate] = &[
    DraftTemplate {
        task_name: "Design user database schema",
        description: "Define tables for users, credentials and sessions with indexes on lookup columns",
        priority: Priority::High,
        risk_level: RiskLevel::Medium,
        estimated_hours: 8,
        confidence_score: 0.90,
    },
    DraftTemplate {
        task_name: "Implement user registration",
        description: "Build the sign-up flow with email validation and password hashing",
        priority: Priority::High,
        risk_level: RiskLevel::Medium,
        estimated_hours: 12,
        confidence_score: 0.85,
    },
    DraftTemplate {
        task_name: "Implement login functionality",
        description: "Verify credentials, start sessions and rate-limit failed attempts",
        priority: Priority::High,
        risk_level: RiskLevel::High,
        estimated_hours: 10,
        confidence_score: 0.80,
    },
    DraftTemplate {
        task_name: "Add password reset flow",
        description: "Send single-use reset links by email and verify the token before accepting a new password",
        priority: Priority::Medium,
        risk_level: RiskLevel::Medium,
        estimated_hours: 8,
        confidence_score: 0.75,
    },
    DraftTemplate {
        task_name: "Implement token management",
        description: "Issue, refresh, expire and revoke access tokens",
        priority: Priority::High,
        risk_level: RiskLevel::High,
        estimated_hours: 12,
        confidence_score: 0.70,
    },
];

const ECOMMERCE_DRAFTS: &[DraftTemplate] = &[
    DraftTemplate {
        task_name: "Build product catalog",
        description: "Model products, categories and pricing with listing and search pages",
        priority: Priority::High,
        risk_level: RiskLevel::Low,
        estimated_hours: 16,
        confidence_score: 0.85,
    },
    DraftTemplate {
        task_name: "Implement shopping cart",
        description: "Add, update and remove cart items with persistent cart state",
        priority: Priority::High,
        risk_level: RiskLevel::Medium,
        estimated_hours: 12,
        confidence_score: 0.80,
    },
    DraftTemplate {
        task_name: "Integrate payment processing",
        description: "Connect a payment gateway and handle authorization, capture and refunds",
        priority: Priority::High,
        risk_level: RiskLevel::High,
        estimated_hours: 20,
        confidence_score: 0.65,
    },
    DraftTemplate {
        task_name: "Build order management",
        description: "Track order lifecycle from checkout to fulfilment with status history",
        priority: Priority::Medium,
        risk_level: RiskLevel::Medium,
        estimated_hours: 16,
        confidence_score: 0.75,
    },
];

const MOBILE_DRAFTS: &[DraftTemplate] = &[
    DraftTemplate {
        task_name: "Set up mobile project",
        description: "Create the app skeleton, build configuration and CI for iOS and Android",
        priority: Priority::High,
        risk_level: RiskLevel::Low,
        estimated_hours: 6,
        confidence_score: 0.95,
    },
    DraftTemplate {
        task_name: "Build core UI components",
        description: "Implement the shared component library and screen layouts",
        priority: Priority::High,
        risk_level: RiskLevel::Medium,
        estimated_hours: 16,
        confidence_score: 0.80,
    },
    DraftTemplate {
        task_name: "Implement app navigation",
        description: "Wire stack and tab navigation with deep-link handling",
        priority: Priority::Medium,
        risk_level: RiskLevel::Low,
        estimated_hours: 8,
        confidence_score: 0.85,
    },
    DraftTemplate {
        task_name: "Add push notifications",
        description: "Register devices and deliver push notifications through platform services",
        priority: Priority::Medium,
        risk_level: RiskLevel::High,
        estimated_hours: 10,
        confidence_score: 0.70,
    },
];

/// Domain table in precedence order.
pub const DOMAIN_TEMPLATES: &[DomainTemplate] = &[
    DomainTemplate {
        domain: Domain::Authentication,
        keywords: &["auth", "login", "user"],
        drafts: AUTHENTICATION_DRAFTS,
    },
    DomainTemplate {
        domain: Domain::ECommerce,
        keywords: &["ecommerce", "shop", "commerce"],
        drafts: ECOMMERCE_DRAFTS,
    },
    DomainTemplate {
        domain: Domain::Mobile,
        keywords: &["mobile", "app"],
        drafts: MOBILE_DRAFTS,
    },
];

/// Research / Design / Implement / Test, used when no keyword matches.
pub const FALLBACK_STEPS: &[FallbackStep] = &[
    FallbackStep {
        verb: "Research",
        description_prefix: "Research requirements and prior art for",
        priority: Priority::Medium,
        risk_level: RiskLevel::Low,
        estimated_hours: 4,
        confidence_score: 0.85,
    },
    FallbackStep {
        verb: "Design",
        description_prefix: "Design the architecture and interfaces for",
        priority: Priority::High,
        risk_level: RiskLevel::Medium,
        estimated_hours: 8,
        confidence_score: 0.80,
    },
    FallbackStep {
        verb: "Implement",
        description_prefix: "Implement the core functionality of",
        priority: Priority::High,
        risk_level: RiskLevel::Medium,
        estimated_hours: 16,
        confidence_score: 0.75,
    },
    FallbackStep {
        verb: "Test",
        description_prefix: "Write tests and validate",
        priority: Priority::Medium,
        risk_level: RiskLevel::Low,
        estimated_hours: 6,
        confidence_score: 0.90,
    },
];

#[cfg(test)]
mod tests {
    use super::{Domain, DOMAIN_TEMPLATES, FALLBACK_STEPS};

    #[test]
    fn table_order_is_authentication_then_ecommerce_then_mobile() {
        let order = DOMAIN_TEMPLATES
            .iter()
            .map(|template| template.domain)
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![Domain::Authentication, Domain::ECommerce, Domain::Mobile]
        );
    }

    #[test]
    fn every_template_value_satisfies_draft_invariants() {
        for template in DOMAIN_TEMPLATES {
            assert!(!template.drafts.is_empty());
            for entry in template.drafts {
                entry.to_draft().validate().expect("template draft is valid");
            }
            for keyword in template.keywords {
                assert_eq!(*keyword, keyword.to_lowercase());
            }
        }
        for step in FALLBACK_STEPS {
            step.render("x").validate().expect("fallback draft is valid");
        }
    }
}
