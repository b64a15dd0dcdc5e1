use std::fmt::Write as _;

use nestscore_config::{AnalysisConfig, WorkflowConfig};
use nestscore_engine::{ComparisonMetrics, ScoreBreakdown};

use crate::errors::FrontendError;
use crate::loader::ComparisonReport;

/// 输出格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
}

pub fn render(
    report: &ComparisonReport,
    format: ReportFormat,
    analysis: &AnalysisConfig,
) -> Result<String, FrontendError> {
    match format {
        ReportFormat::Json => render_json(report),
        ReportFormat::Text => Ok(render_text(report, analysis)),
    }
}

pub fn render_json(report: &ComparisonReport) -> Result<String, FrontendError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn glyph(flag: bool) -> &'static str {
    if flag { "✔" } else { "✘" }
}

/// 每行一个指标，布尔值用 ✔/✘ 表示。
pub fn render_text(report: &ComparisonReport, analysis: &AnalysisConfig) -> String {
    let m = &report.metrics;
    let breakdown = ScoreBreakdown::from_metrics(m, analysis.tab_reference_cap);
    let mut out = String::new();

    let _ = writeln!(out, "生成图纸: {}", report.generated_path);
    let _ = writeln!(out, "参考图纸: {}", report.reference_path);
    let _ = writeln!(out, "{}", "=".repeat(40));
    let _ = writeln!(out, "总分:               {:.1}%", m.overall_score);
    let _ = writeln!(
        out,
        "形状数量一致:       {} ({} vs {})",
        glyph(m.shape_count_match),
        m.shape_count_generated,
        m.shape_count_reference
    );
    let _ = writeln!(
        out,
        "零件数量一致:       {} ({} vs {})",
        glyph(m.ryb_count_match),
        m.ryb_count_generated,
        m.ryb_count_reference
    );
    let _ = writeln!(
        out,
        "槽数量一致:         {} ({} vs {})",
        glyph(m.slot_count_match),
        m.slot_count_generated,
        m.slot_count_reference
    );
    let _ = writeln!(
        out,
        "板材数量:           {} vs {}",
        m.sheet_count_generated, m.sheet_count_reference
    );
    let _ = writeln!(
        out,
        "背板 (面积 > {:.0}): {} / {}",
        analysis.backplane_min_area,
        glyph(m.has_backplane_generated),
        glyph(m.has_backplane_reference)
    );
    let _ = writeln!(
        out,
        "异形背板:           {} / {}",
        glyph(m.is_backplane_organic_generated),
        glyph(m.is_backplane_organic_reference)
    );
    let _ = writeln!(
        out,
        "带卡扣零件:         {} vs {}",
        m.rybs_with_tabs_generated, m.rybs_with_tabs_reference
    );
    let _ = writeln!(out, "零件包围盒重叠:     {:.1}%", m.bounding_box_overlap_rybs);
    let _ = writeln!(out, "槽包围盒重叠:       {:.1}%", m.bounding_box_overlap_slots);
    let _ = writeln!(out, "尺寸分布一致:       {:.1}%", m.size_distribution_match);
    let _ = writeln!(out, "槽宽一致:           {}", glyph(m.slot_width_consistency));

    let _ = writeln!(out, "{}", "-".repeat(40));
    let _ = writeln!(out, "得分构成:");
    let items = [
        ("有槽", breakdown.has_slots),
        ("有零件", breakdown.has_parts),
        ("背板", breakdown.backplane),
        ("异形背板", breakdown.organic_backplane),
        ("带卡扣零件", breakdown.parts_with_tabs),
        ("零件数量", breakdown.part_count),
        ("槽数量", breakdown.slot_count),
    ];
    for (label, score) in items {
        let _ = writeln!(out, "  {label}: {score:.2}");
    }
    out
}

/// 根据指标给出改进建议；总分达标时只返回一条成功提示。
pub fn analysis_hints(
    metrics: &ComparisonMetrics,
    analysis: &AnalysisConfig,
    workflow: &WorkflowConfig,
) -> Vec<String> {
    if metrics.overall_score >= workflow.pass_threshold {
        return vec![format!("总分达到 {:.0}% 阈值。", workflow.pass_threshold)];
    }

    let mut hints = vec![format!(
        "总分低于 {:.0}% 阈值，建议检查：",
        workflow.pass_threshold
    )];
    if !metrics.has_backplane_generated {
        hints.push(format!(
            "  - 背板多边形面积小于 {:.0} mm²。",
            analysis.backplane_min_area
        ));
    }
    if !metrics.slot_width_consistency {
        hints.push(format!(
            "  - 部分槽宽偏离 {:.0}mm 板厚。",
            analysis.material_thickness
        ));
    }
    if metrics.size_distribution_match < 50.0 {
        hints.push("  - 零件面积分布与参考差异较大，请检查波高与比例配置。".to_string());
    }
    hints
}
