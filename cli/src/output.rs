//! # Report Rendering
//!
//! Renders an [`ExportReadinessReport`] for the terminal. Text rendering
//! prints colored sections to stdout; JSON rendering is the serde form of
//! the report, pretty-printed. Progress and error chatter belongs on
//! stderr so `--json` output stays parseable.

use colored::Colorize;

use exportready_core::country::display_name;
use exportready_core::types::{
    Certification, DegradedComponent, EstimateProvenance, ExportReadinessReport, Money,
    MoneyRange, Priority, Severity, StepKind, TaskCategory,
};

/// Longest evidence snippet shown in the text report.
const SNIPPET_CHARS: usize = 120;

/// Render the report as pretty-printed JSON.
pub fn render_json(report: &ExportReadinessReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Print the full text report to stdout.
pub fn print_report(report: &ExportReadinessReport) {
    print_header(report);
    print_warnings(report);
    print_hs_code(report);
    print_certifications(report);
    print_risks(report);
    print_timeline(report);
    print_costs(report);
    print_roadmap(report);
    print_action_plan(report);
    print_subsidies(report);
    print_evidence(report);
    print_meta(report);
}

fn print_header(report: &ExportReadinessReport) {
    println!();
    println!("{}", "Export Readiness Report".bold().underline());
    println!();
    println!("  {} {}", "Product:".dimmed(), report.product_name);
    println!(
        "  {} {} ({})",
        "Destination:".dimmed(),
        display_name(&report.destination_country),
        report.destination_country
    );
    println!(
        "  {} {}",
        "Generated:".dimmed(),
        report.meta.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
}

fn print_warnings(report: &ExportReadinessReport) {
    if !report.degradations.is_empty() {
        println!();
        println!(
            "{} {}",
            "⚠".yellow().bold(),
            "Some pipeline stages degraded; confidence is reduced.".yellow()
        );
        for degradation in &report.degradations {
            println!(
                "    {} {}: {}",
                "⚠".yellow(),
                component_label(degradation.component),
                degradation.reason.dimmed()
            );
        }
    }
    if report.manual_review_recommended {
        println!();
        println!(
            "{} {}",
            "⚠".yellow().bold(),
            "Manual review recommended before acting on this report."
                .yellow()
                .bold()
        );
    }
}

fn print_hs_code(report: &ExportReadinessReport) {
    let hs = &report.hs_code;
    println!();
    println!("{}", "HS Code".cyan().bold());
    println!("  {} {}", "Code:".dimmed(), hs.code.bold());
    let pct = format!("{:.0}%", hs.confidence * 100.0);
    let pct = if hs.confidence >= 0.75 {
        pct.green()
    } else if hs.confidence >= 0.5 {
        pct.yellow()
    } else {
        pct.red()
    };
    println!("  {} {}", "Confidence:".dimmed(), pct);
    if !hs.description.is_empty() {
        println!("  {} {}", "Description:".dimmed(), hs.description);
    }
    if !hs.alternatives.is_empty() {
        println!("  {}", "Alternatives:".dimmed());
        for alternative in &hs.alternatives {
            println!(
                "    {}  {}",
                alternative.code,
                format!("{:.0}%", alternative.confidence * 100.0).dimmed()
            );
        }
    }
    if hs.needs_manual_review {
        println!("  {} {}", "⚠".yellow(), "Verify this code with a customs broker".yellow());
    }
}

fn print_certifications(report: &ExportReadinessReport) {
    println!();
    println!(
        "{} {}",
        "Certifications".cyan().bold(),
        format!("({})", report.certifications.len()).dimmed()
    );
    if report.certifications.is_empty() {
        println!("  {}", "None identified".dimmed());
        return;
    }
    for (i, cert) in report.certifications.iter().enumerate() {
        println!(
            "  {}. {} {} {}",
            i + 1,
            cert.name.bold(),
            mandatory_tag(cert),
            provenance_tag(cert.provenance)
        );
        println!(
            "     {} {}   {} {} days   {} {}",
            "Cost:".dimmed(),
            format_money_range(&cert.estimated_cost),
            "Timeline:".dimmed(),
            cert.estimated_timeline_days,
            "Priority:".dimmed(),
            priority_label(cert.priority)
        );
        if !cert.rationale.is_empty() {
            println!("     {}", cert.rationale.dimmed());
        }
    }
}

fn print_risks(report: &ExportReadinessReport) {
    println!();
    println!("{}", "Risk Analysis".cyan().bold());
    let score = format!("{:.0} / 100", report.risk_score);
    let score = if report.risk_score < 34.0 {
        score.green()
    } else if report.risk_score < 67.0 {
        score.yellow()
    } else {
        score.red()
    };
    println!("  {} {}", "Risk score:".dimmed(), score);
    for risk in &report.risks {
        println!("  {} {}", severity_tag(risk.severity), risk.title);
        println!("     {}", risk.description.dimmed());
        if !risk.mitigation.is_empty() {
            println!("     {} {}", "Mitigation:".dimmed(), risk.mitigation);
        }
    }
}

fn print_timeline(report: &ExportReadinessReport) {
    println!();
    println!(
        "{} {}",
        "Timeline".cyan().bold(),
        format!("({} days total)", report.timeline.total_days).dimmed()
    );
    for phase in &report.timeline.phases {
        println!("  {:<38} {:>4} days", phase.name, phase.duration_days);
    }
}

fn print_costs(report: &ExportReadinessReport) {
    println!();
    println!("{}", "Estimated Costs".cyan().bold());
    for component in &report.costs.components {
        println!(
            "  {:<38} {}",
            component.label,
            format_money_range(&component.range)
        );
    }
    println!(
        "  {:<38} {}",
        "Total".bold(),
        format_money_range(&report.costs.total).bold()
    );
}

fn print_roadmap(report: &ExportReadinessReport) {
    println!();
    println!("{}", "Roadmap".cyan().bold());
    for step in &report.roadmap {
        let after = if step.depends_on.is_empty() {
            String::new()
        } else {
            let numbers: Vec<String> = step.depends_on.iter().map(u32::to_string).collect();
            format!("  (after step {})", numbers.join(", "))
        };
        println!(
            "  {:>2}. {}  {} {} days{}",
            step.number,
            step.title.bold(),
            format!("[{}]", kind_label(step.kind)).dimmed(),
            step.duration_days,
            after.dimmed()
        );
        if !step.description.is_empty() {
            println!("      {}", step.description.dimmed());
        }
    }
}

fn print_action_plan(report: &ExportReadinessReport) {
    println!();
    println!("{}", "First Week Action Plan".cyan().bold());
    for day in &report.action_plan.days {
        println!("  {}", format!("Day {}", day.day).bold());
        if day.tasks.is_empty() {
            println!("    {}", "No scheduled tasks".dimmed());
            continue;
        }
        for task in &day.tasks {
            println!(
                "    • {}  {} ({} days)",
                task.title,
                format!("[{}]", category_label(task.category)).dimmed(),
                task.estimated_duration_days
            );
        }
    }
}

fn print_subsidies(report: &ExportReadinessReport) {
    if report.subsidies.is_empty() {
        return;
    }
    println!();
    println!(
        "{} {}",
        "Eligible Subsidies".cyan().bold(),
        format!("({})", report.subsidies.len()).dimmed()
    );
    for subsidy in &report.subsidies {
        println!(
            "  • {} {}",
            subsidy.name.bold(),
            format!("({})", subsidy.authority).dimmed()
        );
        if let Some(benefit) = &subsidy.max_benefit {
            println!("    {} {}", "Up to:".dimmed(), format_money(benefit));
        }
        println!("    {}", subsidy.description.dimmed());
    }
}

fn print_evidence(report: &ExportReadinessReport) {
    if report.evidence.is_empty() {
        return;
    }
    println!();
    println!(
        "{} {}",
        "Evidence".cyan().bold(),
        format!("({} chunks)", report.evidence.len()).dimmed()
    );
    for item in &report.evidence {
        let country = item
            .country
            .as_deref()
            .map(|c| format!(" [{c}]"))
            .unwrap_or_default();
        println!(
            "  • {}{}  {}",
            item.source,
            country.dimmed(),
            format!("similarity {:.2}", item.similarity).dimmed()
        );
        println!(
            "    {}",
            format!("\"{}\"", truncate_snippet(&item.snippet, SNIPPET_CHARS)).dimmed()
        );
    }
}

fn print_meta(report: &ExportReadinessReport) {
    let meta = &report.meta;
    let mut parts = vec![
        format!("engine {}", meta.engine_version),
        format!("rules {}", meta.rule_table_version),
    ];
    if let Some(model) = &meta.generative_model {
        parts.push(format!("model {model}"));
    }
    if let Some(model) = &meta.embedding_model {
        parts.push(format!("embeddings {model}"));
    }
    println!();
    println!("{}", format!("Generated by {}", parts.join(", ")).dimmed());
    println!();
}

fn mandatory_tag(cert: &Certification) -> colored::ColoredString {
    if cert.mandatory {
        "[required]".red().bold()
    } else {
        "[optional]".dimmed()
    }
}

fn provenance_tag(provenance: EstimateProvenance) -> colored::ColoredString {
    match provenance {
        EstimateProvenance::Verified => "✓ verified".green(),
        EstimateProvenance::Estimated => "~ estimated".yellow(),
    }
}

fn severity_tag(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::High => "[HIGH]".red().bold(),
        Severity::Medium => "[MEDIUM]".yellow(),
        Severity::Low => "[LOW]".dimmed(),
    }
}

fn component_label(component: DegradedComponent) -> &'static str {
    match component {
        DegradedComponent::Retrieval => "evidence retrieval",
        DegradedComponent::HsModel => "HS classification",
        DegradedComponent::CertificationModel => "certification resolution",
        DegradedComponent::Subsidies => "subsidy lookup",
    }
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "high",
        Priority::Medium => "medium",
        Priority::Low => "low",
    }
}

fn kind_label(kind: StepKind) -> &'static str {
    match kind {
        StepKind::Registration => "registration",
        StepKind::Certification => "certification",
        StepKind::Mitigation => "mitigation",
        StepKind::Logistics => "logistics",
    }
}

fn category_label(category: TaskCategory) -> &'static str {
    match category {
        TaskCategory::Registration => "registration",
        TaskCategory::Documentation => "documentation",
        TaskCategory::Certification => "certification",
        TaskCategory::RiskMitigation => "risk mitigation",
        TaskCategory::Outreach => "outreach",
    }
}

/// Format an amount of money, with Indian digit grouping for rupees.
fn format_money(money: &Money) -> String {
    if money.currency == "INR" {
        format!("₹{}", group_indian(money.amount))
    } else {
        format!("{} {}", money.currency, group_western(money.amount))
    }
}

/// Format a money range, collapsing degenerate ranges to a single value.
fn format_money_range(range: &MoneyRange) -> String {
    if range.min.amount == range.max.amount {
        format_money(&range.min)
    } else {
        format!("{} - {}", format_money(&range.min), format_money(&range.max))
    }
}

/// Indian digit grouping: the last three digits, then groups of two, as in
/// "12,34,567".
fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    groups.push(rest);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Western digit grouping in threes, as in "1,234,567".
fn group_western(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Cut a snippet at a character boundary, appending an ellipsis when text
/// was dropped.
fn truncate_snippet(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
