//! The built-in demonstration report, served when no other source is configured.

use crate::model::RawNode;

/// Returns the "Annual Report" demonstration tree. Every node has a fixed id, so the ids shown for
/// one load can be used to edit the next.
pub fn annual_report() -> RawNode {
    RawNode::section(
        "Annual Report",
        vec![
            RawNode::section(
                "Sales",
                vec![
                    entry("q1-sales", "Q1 Sales", 120, "Strong performance in North America"),
                    entry("q2-sales", "Q2 Sales", 140, "European market showed slight growth"),
                    entry("q3-sales", "Q3 Sales", 110, "Asia-Pacific underperformed expectations"),
                    entry("q4-sales", "Q4 Sales", 130, "Holiday promotions boosted revenue"),
                ],
            )
            .with_id("sales"),
            RawNode::section(
                "Marketing",
                vec![
                    entry(
                        "digital-campaigns",
                        "Digital Campaigns",
                        180,
                        "Social media ads had the highest ROI",
                    ),
                    entry(
                        "event-sponsorships",
                        "Event Sponsorships",
                        120,
                        "Sponsored 5 major industry events",
                    ),
                ],
            )
            .with_id("marketing"),
            RawNode::section(
                "R&D",
                vec![
                    entry(
                        "new-product-development",
                        "New Product Development",
                        150,
                        "Three prototypes developed and tested",
                    ),
                    entry(
                        "innovation-lab",
                        "Innovation Lab",
                        100,
                        "Ongoing AI-based experimentation",
                    ),
                ],
            )
            .with_id("rnd"),
            RawNode::section(
                "Operations",
                vec![
                    RawNode::section(
                        "HR",
                        vec![entry(
                            "hr-tool",
                            "HR tool",
                            20,
                            "Yearly cost to manage roles and applicants",
                        )],
                    )
                    .with_id("hr"),
                    entry(
                        "logistics",
                        "Logistics",
                        90,
                        "Improved efficiency through route optimization",
                    ),
                    entry(
                        "customer-support",
                        "Customer Support",
                        60,
                        "Reduced average resolution time by 15%",
                    ),
                ],
            )
            .with_id("operations"),
        ],
    )
    .with_id("annual-report")
}

fn entry(id: &str, name: &str, sum: i64, note: &str) -> RawNode {
    RawNode::entry(name, sum).with_note(note).with_id(id)
}
