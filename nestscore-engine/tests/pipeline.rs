use std::collections::BTreeSet;
use std::f64::consts::PI;

use nestscore_config::AnalysisConfig;
use nestscore_core::document::{Document, PolylineVertex};
use nestscore_core::geometry::Point2;
use nestscore_engine::{
    Primitive, PrimitiveKind, ShapeType, analyze_document, compare_documents, fuse_primitives,
};

fn rectangle(min_x: f64, min_y: f64, width: f64, height: f64) -> Vec<Point2> {
    vec![
        Point2::new(min_x, min_y),
        Point2::new(min_x + width, min_y),
        Point2::new(min_x + width, min_y + height),
        Point2::new(min_x, min_y + height),
    ]
}

/// 一张 1200x2400 板、三个 50x50 方形零件、两个 12x30 带弧槽。
fn nesting_layout() -> Document {
    let mut doc = Document::new();
    doc.add_polyline(rectangle(0.0, 0.0, 1200.0, 2400.0), true, "SHEET");
    for offset in [100.0, 200.0, 300.0] {
        doc.add_polyline(rectangle(offset, 100.0, 50.0, 50.0), true, "PARTS");
    }
    for offset in [500.0, 600.0] {
        let corners = rectangle(offset, 100.0, 12.0, 30.0);
        let vertices = corners.into_iter().enumerate().map(|(index, position)| {
            if index % 2 == 1 {
                PolylineVertex::with_bulge(position, 1.0)
            } else {
                PolylineVertex::new(position)
            }
        });
        doc.add_polyline_with_vertices(vertices, true, "SLOTS");
    }
    doc
}

#[test]
fn nesting_layout_against_itself_scores_from_weights() {
    let config = AnalysisConfig::default();
    let doc = nesting_layout();
    let metrics = compare_documents(&doc, &doc, &config);

    assert_eq!(metrics.shape_count_generated, 6);
    assert_eq!(metrics.shape_count_reference, 6);
    assert!(metrics.shape_count_match);
    assert_eq!(metrics.ryb_count_generated, 3);
    assert!(metrics.ryb_count_match);
    assert_eq!(metrics.slot_count_generated, 2);
    assert!(metrics.slot_count_match);
    assert_eq!(metrics.sheet_count_generated, 1);
    assert_eq!(metrics.bounding_box_overlap_rybs, 100.0);
    assert_eq!(metrics.bounding_box_overlap_slots, 100.0);
    assert_eq!(metrics.size_distribution_match, 100.0);
    assert!(metrics.slot_width_consistency);
    assert!(!metrics.has_backplane_generated);
    assert_eq!(metrics.rybs_with_tabs_generated, 0);
    // 有槽 15 + 有零件 15 + 零件数 15 + 槽数 15；无背板，卡扣零件不足 3 个
    assert_eq!(metrics.overall_score, 60.0);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let config = AnalysisConfig::default();
    let generated = nesting_layout();
    let mut reference = nesting_layout();
    reference.add_circle(Point2::new(900.0, 900.0), 30.0, "HOLES");

    let first = serde_json::to_string(&compare_documents(&generated, &reference, &config))
        .expect("serialize");
    let second = serde_json::to_string(&compare_documents(&generated, &reference, &config))
        .expect("serialize");
    assert_eq!(first, second);
}

#[test]
fn identical_input_hits_every_upper_bound() {
    let config = AnalysisConfig::default();
    let mut doc = nesting_layout();
    doc.add_polyline(rectangle(100.0, 400.0, 900.0, 900.0), true, "BACK");
    doc.add_line(Point2::new(700.0, 100.0), Point2::new(760.0, 100.0), "CUT");
    doc.add_line(Point2::new(760.0, 100.0), Point2::new(760.0, 180.0), "CUT");

    let metrics = compare_documents(&doc, &doc, &config);
    assert!(metrics.shape_count_match);
    assert!(metrics.ryb_count_match);
    assert!(metrics.slot_count_match);
    assert_eq!(metrics.bounding_box_overlap_rybs, 100.0);
    assert_eq!(metrics.bounding_box_overlap_slots, 100.0);
    assert_eq!(metrics.size_distribution_match, 100.0);
    assert!(metrics.has_backplane_generated);
}

#[test]
fn empty_drawing_against_layout_is_defined() {
    let config = AnalysisConfig::default();
    let empty = Document::new();
    let layout = nesting_layout();

    let metrics = compare_documents(&empty, &layout, &config);
    assert_eq!(metrics.shape_count_generated, 0);
    assert_eq!(metrics.bounding_box_overlap_rybs, 0.0);
    assert_eq!(metrics.size_distribution_match, 0.0);
    assert!(!metrics.slot_width_consistency);
    assert_eq!(metrics.overall_score, 0.0);

    let reversed = compare_documents(&layout, &empty, &config);
    assert!(reversed.overall_score.is_finite());
    assert_eq!(reversed.ryb_count_reference, 0);
}

#[test]
fn classification_is_disjoint() {
    let config = AnalysisConfig {
        slot_max_area: f64::MAX,
        slot_classify_tolerance: 10_000.0,
        ..AnalysisConfig::default()
    };
    let mut doc = nesting_layout();
    doc.add_polyline_with_vertices(
        rectangle(0.0, 3000.0, 1500.0, 2500.0)
            .into_iter()
            .map(|position| PolylineVertex::with_bulge(position, 0.5)),
        true,
        "SHEET",
    );

    let classified = analyze_document(&doc, &config).classified;
    let key = |d: &nestscore_engine::ShapeDescriptor| {
        (d.min_x.to_bits(), d.min_y.to_bits(), d.max_x.to_bits(), d.max_y.to_bits())
    };
    let sheets: BTreeSet<_> = classified.sheets.iter().map(key).collect();
    let slots: BTreeSet<_> = classified.slots.iter().map(key).collect();
    let parts: BTreeSet<_> = classified.parts.iter().map(key).collect();

    assert_eq!(classified.sheets.len(), 2);
    assert!(sheets.is_disjoint(&slots));
    assert!(parts.is_disjoint(&sheets));
    assert!(parts.is_disjoint(&slots));
    assert!(
        classified.sheets.len() + classified.slots.len() + classified.parts.len()
            <= classified.total
    );
}

fn labelled_line(label: usize, from: (f64, f64), to: (f64, f64)) -> Primitive {
    let points = vec![Point2::new(from.0, from.1), Point2::new(to.0, to.1)];
    Primitive {
        kind: PrimitiveKind::Line,
        bbox_points: points.clone(),
        points,
        curvature_flags: Vec::new(),
        layer: format!("L{label}"),
    }
}

fn partition(primitives: &[Primitive]) -> BTreeSet<BTreeSet<String>> {
    fuse_primitives(primitives, 2)
        .into_iter()
        .map(|group| group.members.iter().map(|p| p.layer.clone()).collect())
        .collect()
}

#[test]
fn fusion_partition_is_order_independent() {
    let primitives = vec![
        labelled_line(0, (0.0, 0.0), (10.0, 0.0)),
        labelled_line(1, (10.0, 0.0), (10.0, 10.0)),
        labelled_line(2, (10.0, 10.0), (0.0, 10.0)),
        labelled_line(3, (20.0, 20.0), (30.0, 20.0)),
        labelled_line(4, (0.0, 10.0), (0.0, 0.0)),
        labelled_line(5, (30.0, 20.0), (30.0, 30.0)),
        labelled_line(6, (10.0, 0.0), (15.0, -5.0)),
        labelled_line(7, (50.0, 50.0), (60.0, 60.0)),
    ];
    let expected = partition(&primitives);
    assert_eq!(expected.len(), 3);

    let orders: [[usize; 8]; 4] = [
        [7, 6, 5, 4, 3, 2, 1, 0],
        [3, 0, 5, 2, 7, 4, 1, 6],
        [6, 1, 4, 7, 0, 3, 2, 5],
        [2, 4, 6, 0, 1, 3, 5, 7],
    ];
    for order in orders {
        let permuted: Vec<Primitive> = order.iter().map(|&i| primitives[i].clone()).collect();
        assert_eq!(partition(&permuted), expected, "order {order:?}");
    }
}

/// 两条直边加两段半圆弧拼成的长圆槽，弧端点由角度计算得出。
fn obround_slot(doc: &mut Document, min_x: f64, min_y: f64, width: f64, height: f64) {
    let radius = width / 2.0;
    let bottom = Point2::new(min_x + radius, min_y + radius);
    let top = Point2::new(min_x + radius, min_y + height - radius);
    doc.add_arc(bottom, radius, PI, 2.0 * PI, "SLOTS");
    doc.add_line(
        Point2::new(min_x + width, bottom.y()),
        Point2::new(min_x + width, top.y()),
        "SLOTS",
    );
    doc.add_arc(top, radius, 0.0, PI, "SLOTS");
    doc.add_line(Point2::new(min_x, top.y()), Point2::new(min_x, bottom.y()), "SLOTS");
}

#[test]
fn arcs_chain_with_lines_into_one_slot() {
    let mut doc = Document::new();
    obround_slot(&mut doc, 700.0, 100.0, 12.0, 30.0);

    let analysis = analyze_document(&doc, &AnalysisConfig::default());
    assert_eq!(analysis.primitive_count, 4);
    assert_eq!(analysis.descriptors.len(), 1);

    let slot = &analysis.descriptors[0];
    assert_eq!(slot.shape_type, ShapeType::Composite);
    assert_eq!(slot.width, 12.0);
    assert_eq!(slot.height, 30.0);
    assert!(slot.has_curvature);

    assert_eq!(analysis.classified.slot_count(), 1);
    assert_eq!(analysis.classified.part_count(), 0);
}
