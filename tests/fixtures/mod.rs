//! Shared test data: keyword candidate lists and backend payloads.

use seo_audit_hw::models::keyword::{Intent, Keyword};

/// Candidates for a plumbing company's services page.
pub fn plumbing_candidates() -> Vec<Keyword> {
    vec![
        Keyword::new("plumber austin")
            .with_volume(500)
            .with_difficulty(20.0)
            .with_intent(Intent::Local),
        Keyword::new("emergency plumber")
            .with_volume(50)
            .with_difficulty(80.0)
            .with_intent(Intent::Transactional),
        Keyword::new("plumbing services near me")
            .with_volume(1200)
            .with_difficulty(65.0)
            .with_intent(Intent::Local),
        Keyword::new("how to fix a leaky faucet")
            .with_volume(3000)
            .with_difficulty(35.0)
            .with_intent(Intent::Informational),
        Keyword::new("plumbing supply store"),
    ]
}

pub const PAGE_NAME: &str = "Plumbing Services";
pub const SERVICE: &str = "plumbing";

/// Status body for a finished analysis with three recommendations.
pub const COMPLETED_STATUS_BODY: &str = r#"{
    "analysis": {
        "status": "completed",
        "analyzedAt": "2024-06-03T09:30:00Z",
        "insights": {"pagesCrawled": 42, "brokenLinks": 3},
        "recommendations": [
            {"category": "technical", "priority": "high", "title": "Fix broken links", "description": "3 links return 404", "action": "Update or remove the links"},
            {"category": "content", "priority": "medium", "title": "Add FAQ section", "description": "Service pages lack FAQs", "action": "Write an FAQ", "completed": true},
            {"category": "local", "priority": "high", "title": "Claim business profile", "description": "No verified listing", "action": "Verify the listing"}
        ]
    }
}"#;
