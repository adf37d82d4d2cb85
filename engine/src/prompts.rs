//! Prompt construction for the generative stages.
//!
//! Two prompt pairs: HS classification and certification resolution. Both
//! ground the model in retrieved regulatory text and any rule-table hints,
//! and both demand a bare JSON reply that `structured` can parse.

use exportready_core::category::ProductCategory;
use exportready_core::country::display_name;
use exportready_core::types::QueryInput;
use exportready_rag::RetrievedEvidence;
use exportready_rules::{CertificationHint, HsChapterHint};

/// Longest evidence snippet quoted into a prompt. Chunks run up to 1200
/// chars; quoting them whole would crowd out the instructions.
const MAX_SNIPPET_CHARS: usize = 600;

/// System prompt for HS code prediction.
pub fn hs_system_prompt() -> String {
    r#"You are an export compliance analyst who classifies products under the Harmonized System.

Given a product description and excerpts from regulatory references, predict the most likely HS code at 6 digits (or the 8-digit SAC code for software and services).

When answering:
- Ground the prediction in the referenced excerpts where they apply
- State confidence honestly; do not inflate it when the description is vague
- List plausible alternative codes with lower confidence
- Keep the rationale to one or two sentences

Respond with ONLY a JSON object, no prose and no code fences, shaped as:
{"code": "0910.30", "confidence": 0.85, "description": "Turmeric (curcuma)", "alternatives": [{"code": "0910.99", "confidence": 0.3}], "rationale": "..."}"#
        .to_string()
}

/// User prompt for HS code prediction.
pub fn hs_user_prompt(
    query: &QueryInput,
    category: ProductCategory,
    hint: Option<&HsChapterHint>,
    evidence: &[RetrievedEvidence],
) -> String {
    let mut prompt = format!(
        r#"**Product:** {}
**Derived category:** {}
**Destination market:** {}"#,
        query.description_text(),
        category.as_str(),
        destination_line(&query.destination_country),
    );

    if let Some(hint) = hint {
        prompt.push_str(&format!(
            "\n**Chapter guidance:** products in this category usually fall under HS chapter {} ({}), for example {}.",
            hint.chapter, hint.description, hint.default_code
        ));
    }

    push_evidence_block(&mut prompt, evidence);
    prompt.push_str("\n\nClassify this product. Respond with ONLY the JSON object.");
    prompt
}

/// System prompt for certification resolution.
pub fn certification_system_prompt() -> String {
    r#"You are an export compliance analyst advising an Indian exporter on destination-market certifications.

Given a product, a destination market, certifications already established from the compliance rule set, and excerpts from regulatory references, propose any further certifications the exporter needs and flag established candidates that clearly do not apply.

When answering:
- Never drop or weaken a certification listed as established; those are settled
- Propose a certification only when the product and destination genuinely call for it
- Mark mandatory=true only for legal requirements, not good-practice schemes
- Estimate cost in INR and timeline in days when the excerpts support an estimate; omit the fields otherwise
- Use ruled_out only for established candidates that the excerpts show cannot apply

Respond with ONLY a JSON object, no prose and no code fences, shaped as:
{"certifications": [{"name": "FDA Facility Registration", "certification_type": "fda", "mandatory": true, "confidence": 0.8, "rationale": "...", "estimated_cost_min": 20000, "estimated_cost_max": 80000, "estimated_days": 45}], "ruled_out": []}"#
        .to_string()
}

/// User prompt for certification resolution.
pub fn certification_user_prompt(
    query: &QueryInput,
    category: ProductCategory,
    rule_hints: &[CertificationHint],
    evidence: &[RetrievedEvidence],
) -> String {
    let mut prompt = format!(
        r#"**Product:** {}
**Derived category:** {}
**Destination market:** {}
**Business type:** {}
**Company size:** {}"#,
        query.description_text(),
        category.as_str(),
        destination_line(&query.destination_country),
        query.business_type.as_str(),
        query.company_size.as_str(),
    );

    if rule_hints.is_empty() {
        prompt.push_str("\n**Established certifications:** none yet.");
    } else {
        prompt.push_str("\n**Established certifications:**");
        for hint in rule_hints {
            let obligation = if hint.mandatory { "mandatory" } else { "recommended" };
            prompt.push_str(&format!(
                "\n- {} ({}, {}): {}",
                hint.name,
                hint.certification_type.as_str(),
                obligation,
                hint.rationale
            ));
        }
    }

    push_evidence_block(&mut prompt, evidence);
    prompt.push_str(
        "\n\nPropose additional certifications and rule-outs. Respond with ONLY the JSON object.",
    );
    prompt
}

fn destination_line(iso: &str) -> String {
    let name = display_name(iso);
    if name == iso {
        iso.to_string()
    } else {
        format!("{name} ({iso})")
    }
}

fn push_evidence_block(prompt: &mut String, evidence: &[RetrievedEvidence]) {
    if evidence.is_empty() {
        prompt.push_str("\n\n**Regulatory references:** none retrieved.");
        return;
    }
    prompt.push_str("\n\n**Regulatory references:**");
    for item in evidence {
        let snippet = truncate_snippet(&item.chunk.text);
        prompt.push_str(&format!(
            "\n[{}] {}: {}",
            item.rank, item.chunk.source, snippet
        ));
    }
}

fn truncate_snippet(text: &str) -> String {
    if text.len() <= MAX_SNIPPET_CHARS {
        return text.to_string();
    }
    let mut end = MAX_SNIPPET_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
