// Output formatting utilities

use crate::models::{Program, ProcurementInstance, ProcurementType, StageEntry, StageTemplate};
use crate::schedule::InstanceReport;
use crate::utils::format_date;
use serde_json::{json, Value};

/// An instance together with everything needed to display it
pub struct InstanceSummary {
    pub instance: ProcurementInstance,
    pub type_name: String,
    pub program: Option<Program>,
    pub report: InstanceReport,
}

impl InstanceSummary {
    /// First stage without a recorded completion
    pub fn current_stage(&self) -> Option<&StageEntry> {
        self.report.stages.iter().find(|e| !e.progress.is_completed())
    }
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to the COLUMNS environment
/// variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// Shorten `text` to `width` characters, marking the cut with ".."
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(2)).collect();
    format!("{}..", kept)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Rupiah amount with '.' thousands separators, e.g. "Rp 150.000.000"
pub fn format_budget(budget: Option<i64>) -> String {
    let Some(amount) = budget else {
        return "-".to_string();
    };
    let digits = amount.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("Rp -{}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

fn format_duration_days(duration: Option<u32>) -> String {
    match duration {
        Some(days) => days.to_string(),
        None => "var".to_string(),
    }
}

fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.0}", weight)
    } else {
        format!("{}", weight)
    }
}

/// Format the procurement type catalog as a table
pub fn format_type_list(types: &[(ProcurementType, Vec<StageTemplate>)]) -> String {
    if types.is_empty() {
        return "No procurement types found.".to_string();
    }

    let id_width = types
        .iter()
        .map(|(t, _)| t.id.unwrap_or(0).to_string().len())
        .max()
        .unwrap_or(0)
        .max(2);
    let name_width = types
        .iter()
        .map(|(t, _)| t.name.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(4, 40);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<id$} {:<name$} {:>6} {:>10}\n",
        "ID", "Name", "Stages", "Fixed days",
        id = id_width,
        name = name_width
    ));
    output.push_str(&format!("{}\n", "-".repeat(id_width + name_width + 19)));

    for (ty, stages) in types {
        let fixed_days: u32 = stages.iter().filter_map(|s| s.duration_days).sum();
        output.push_str(&format!(
            "{:<id$} {:<name$} {:>6} {:>10}\n",
            ty.id.unwrap_or(0),
            truncate(&ty.name, name_width),
            stages.len(),
            fixed_days,
            id = id_width,
            name = name_width
        ));
    }

    output
}

/// Format the stage templates of one procurement type
pub fn format_type_detail(ty: &ProcurementType, stages: &[StageTemplate]) -> String {
    let mut output = String::new();
    output.push_str(&format!("Procurement type {}: {}\n\n", ty.id.unwrap_or(0), ty.name));

    let name_width = stages
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(5, 60);

    output.push_str(&format!(
        "{:>3} {:<name$} {:>4} {:>6}\n",
        "Seq", "Stage", "Days", "Weight",
        name = name_width
    ));
    output.push_str(&format!("{}\n", "-".repeat(name_width + 16)));
    for stage in stages {
        output.push_str(&format!(
            "{:>3} {:<name$} {:>4} {:>6}\n",
            stage.sequence,
            truncate(&stage.name, name_width),
            format_duration_days(stage.duration_days),
            format_weight(stage.weight),
            name = name_width
        ));
    }

    output
}

/// Format programs as a table
pub fn format_program_list(programs: &[Program]) -> String {
    if programs.is_empty() {
        return "No programs found.".to_string();
    }

    let slug_width = programs.iter().map(|p| p.slug.len()).max().unwrap_or(0).clamp(4, 30);
    let name_width = programs
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(4, 40);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<4} {:<slug$} {:<name$} {}\n",
        "ID", "Slug", "Name", "Agency",
        slug = slug_width,
        name = name_width
    ));
    output.push_str(&format!("{}\n", "-".repeat(slug_width + name_width + 16)));
    for program in programs {
        output.push_str(&format!(
            "{:<4} {:<slug$} {:<name$} {}\n",
            program.id.unwrap_or(0),
            truncate(&program.slug, slug_width),
            truncate(&program.name, name_width),
            program.agency.as_deref().unwrap_or(""),
            slug = slug_width,
            name = name_width
        ));
    }

    output
}

/// Format procurement instances as a table
pub fn format_instance_list(summaries: &[InstanceSummary]) -> String {
    if summaries.is_empty() {
        return "No procurements found.".to_string();
    }

    let title_width = summaries
        .iter()
        .map(|s| s.instance.title.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(5, 40);
    let type_width = summaries
        .iter()
        .map(|s| s.type_name.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(4, 24);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<4} {:<title$} {:<ty$} {:<12} {:>7} {}\n",
        "ID", "Title", "Type", "Program", "Done", "Current stage",
        title = title_width,
        ty = type_width
    ));
    output.push_str(&format!("{}\n", "-".repeat(title_width + type_width + 44)));

    for summary in summaries {
        let program = summary
            .program
            .as_ref()
            .map(|p| truncate(&p.slug, 12))
            .unwrap_or_default();
        let current = match summary.current_stage() {
            Some(entry) => format!("{}. {}", entry.sequence(), entry.template.name),
            None => "(finished)".to_string(),
        };
        output.push_str(&format!(
            "{:<4} {:<title$} {:<ty$} {:<12} {:>7} {}\n",
            summary.instance.id.unwrap_or(0),
            truncate(&summary.instance.title, title_width),
            truncate(&summary.type_name, type_width),
            program,
            format_percent(summary.report.percent_complete),
            current,
            title = title_width,
            ty = type_width
        ));
    }

    output
}

/// Format one procurement with its full stage table
pub fn format_instance_detail(summary: &InstanceSummary) -> String {
    let instance = &summary.instance;
    let mut output = String::new();

    output.push_str(&format!("Procurement {}: {}\n", instance.id.unwrap_or(0), instance.title));
    output.push_str(&format!("  Type:     {}\n", summary.type_name));
    if let Some(program) = &summary.program {
        output.push_str(&format!("  Program:  {} ({})\n", program.name, program.slug));
    }
    output.push_str(&format!("  Budget:   {}\n", format_budget(instance.budget)));
    output.push_str(&format!("  Anchor:   {}\n", format_date(Some(instance.anchor_date))));
    output.push_str(&format!("  Progress: {}\n\n", format_percent(summary.report.percent_complete)));

    // Fixed columns take 70 characters; the stage name gets the rest
    let name_width = get_terminal_width().saturating_sub(70).clamp(16, 60);

    output.push_str(&format!(
        "{:>3} {:<name$} {:>4} {:<9} {:<10} {:<10} {:<10} {:<10}\n",
        "Seq", "Stage", "Days", "Status", "Plan start", "Plan end", "Act start", "Act end",
        name = name_width
    ));
    output.push_str(&format!("{}\n", "-".repeat(name_width + 70)));

    for entry in &summary.report.stages {
        let progress = &entry.progress;
        output.push_str(&format!(
            "{:>3} {:<name$} {:>4} {:<9} {:<10} {:<10} {:<10} {:<10}\n",
            entry.sequence(),
            truncate(&entry.template.name, name_width),
            format_duration_days(entry.template.duration_days),
            progress.status.as_str(),
            format_date(progress.planned_start),
            format_date(progress.planned_end),
            format_date(progress.actual_start),
            format_date(progress.actual_end),
            name = name_width
        ));
        if let Some(note) = &progress.note {
            output.push_str(&format!("    note: {}\n", note));
        }
    }

    output
}

/// JSON form of a procurement and its stages
pub fn instance_json(summary: &InstanceSummary) -> Value {
    let instance = &summary.instance;
    let stages: Vec<Value> = summary
        .report
        .stages
        .iter()
        .map(|entry| {
            let p = &entry.progress;
            json!({
                "sequence": entry.sequence(),
                "name": entry.template.name,
                "duration_days": entry.template.duration_days,
                "is_duration_editable": entry.template.is_duration_editable(),
                "weight": entry.template.weight,
                "status": p.status.as_str(),
                "planned_start": p.planned_start,
                "planned_end": p.planned_end,
                "actual_start": p.actual_start,
                "actual_end": p.actual_end,
                "note": p.note,
            })
        })
        .collect();

    json!({
        "id": instance.id,
        "uuid": instance.uuid,
        "title": instance.title,
        "type": summary.type_name,
        "program": summary.program.as_ref().map(|p| p.slug.clone()),
        "budget": instance.budget,
        "anchor_date": instance.anchor_date,
        "percent_complete": summary.report.percent_complete,
        "stages": stages,
    })
}

/// JSON form of a procurement type and its templates
pub fn type_json(ty: &ProcurementType, stages: &[StageTemplate]) -> Value {
    json!({
        "id": ty.id,
        "name": ty.name,
        "stages": stages,
    })
}
