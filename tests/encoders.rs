mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use common::{assert_close, contains, count};
use shelf_labels::{
    BarcodeRasterizer, Code128Rasterizer, Error, FieldConfig, FieldKey, FieldLayout, LabelJob,
    OutputFormat, PartialPosition, PartialPositions, Product, RenderConfig, build_layout,
    export_labels, mm_to_dots, mm_to_points, render_pdf, render_tspl, render_zpl,
    resolve_positions,
};

/// Counts calls and delegates to the real Code-128 rasterizer.
#[derive(Default)]
struct CountingRasterizer {
    calls: AtomicUsize,
    inner: Code128Rasterizer,
}

impl BarcodeRasterizer for CountingRasterizer {
    fn render_png(&self, text: &str) -> Result<Vec<u8>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.render_png(text)
    }
}

fn zpl_origin(line: &str) -> (i64, i64) {
    let rest = line.strip_prefix("^FO").expect("field origin");
    let end = rest.find('^').expect("command after ^FO");
    let (x, y) = rest[..end].split_once(',').expect("x,y");
    (x.parse().expect("x"), y.parse().expect("y"))
}

#[test]
fn tspl_roll_output_shape() {
    for n in [1, 3, 12] {
        let products = common::products(n);
        let layout = build_layout(&common::roll_grid(), &products).expect("layout");
        let tspl = render_tspl(&layout, &common::all_fields(), &RenderConfig::default());
        let lines: Vec<&str> = tspl.lines().collect();

        assert!(tspl.starts_with("SIZE 50 mm,30 mm"));
        assert_eq!(&lines[1..4], &["GAP 2 mm,0 mm", "DIRECTION 1", "CLS"]);
        assert_eq!(lines.iter().filter(|l| **l == "PRINT 1,1").count(), 1);
        assert_eq!(lines.last(), Some(&"PRINT 1,1"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("BOX ")).count(), n);
    }
}

#[test]
fn tspl_commands_for_default_positions() {
    let products = vec![common::product(7)];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let tspl = render_tspl(&layout, &common::all_fields(), &RenderConfig::default());
    let lines: Vec<&str> = tspl.lines().collect();

    assert_eq!(
        lines,
        vec![
            "SIZE 50 mm,30 mm",
            "GAP 2 mm,0 mm",
            "DIRECTION 1",
            "CLS",
            "BOX 0,0,400,240,2",
            "TEXT 16,14,\"3\",0,1,1,\"Latex Interior 7\"",
            "TEXT 16,67,\"3\",0,1,1,\"Cod: PINT-007\"",
            "TEXT 16,96,\"4\",0,1,1,\"$ 1.007,00\"",
            "TEXT 248,96,\"3\",0,1,1,\"Unidad: UN\"",
            "TEXT 248,153,\"3\",0,1,1,\"Val: 2026-12-31\"",
            "BARCODE 16,182,\"128\",43,1,0,2,2,\"7791234500007\"",
            "PRINT 1,1",
        ]
    );
}

#[test]
fn tspl_replaces_double_quotes() {
    let products = vec![Product {
        description: "Pincel 2\" \"Pro\"".to_string(),
        ..common::product(1)
    }];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let tspl = render_tspl(&layout, &common::all_fields(), &RenderConfig::default());
    assert!(tspl.contains("\"Pincel 2' 'Pro'\""));
}

#[test]
fn tspl_keeps_each_command_on_one_line() {
    let products = vec![Product {
        description: "Latex\nPRINT 1,1\r\nCLS".to_string(),
        unit: "UN\tx".to_string(),
        ..common::product(1)
    }];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let tspl = render_tspl(&layout, &common::all_fields(), &RenderConfig::default());
    let lines: Vec<&str> = tspl.lines().collect();

    assert_eq!(lines.iter().filter(|l| **l == "PRINT 1,1").count(), 1);
    assert_eq!(lines.iter().filter(|l| **l == "CLS").count(), 1);
    assert_eq!(lines.last(), Some(&"PRINT 1,1"));
    assert!(tspl.contains("\"Latex PRINT 1,1  CLS\""));
    assert!(tspl.contains("\"Unidad: UN x\""));
}

#[test]
fn zpl_commands_for_default_positions() {
    let products = vec![common::promo_product()];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let zpl = render_zpl(&layout, &common::all_fields(), &RenderConfig::default());
    let lines: Vec<&str> = zpl.lines().collect();

    assert_eq!(&lines[..2], &["^XA", "^CI28"]);
    assert_eq!(lines.last(), Some(&"^XZ"));
    assert_eq!(lines[2], "^FO0,0^GB400,240,2^FS");
    assert_eq!(lines[3], "^FO16,14^A0N,20,20^FB368,2,0,L,0^FDLatex Interior 1^FS");
    assert!(lines.contains(&"^FO16,96^A0N,40,40^FB220,1,0,L,0^FD$ 58.999,00^FS"));
    assert!(lines.contains(&"^FO16,153^A0N,24,24^FB240,1,0,L,0^FDPromo: $ 52.999,00^FS"));
    assert!(lines.contains(&"^FO16,182^BY2^BCN,43,N,N,N^FD7791234500001^FS"));
}

#[test]
fn zpl_strips_command_prefixes_from_text() {
    let products = vec![Product {
        description: "Oferta ^XZ ~JA".to_string(),
        ..common::product(1)
    }];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let zpl = render_zpl(&layout, &common::all_fields(), &RenderConfig::default());
    assert!(zpl.contains("^FDOferta  XZ  JA^FS"));
    assert_eq!(zpl.matches("^XZ").count(), 1);
}

#[test]
fn zpl_flattens_line_breaks_and_keeps_utf8() {
    let products = vec![Product {
        description: "Pincel\nÑandú".to_string(),
        ..common::product(1)
    }];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let zpl = render_zpl(&layout, &common::all_fields(), &RenderConfig::default());
    assert!(zpl.contains("^FDPincel Ñandú^FS"));
    assert!(zpl.lines().all(|l| l.starts_with('^')));
}

#[test]
fn zpl_writes_every_page_into_one_label_format() {
    let _ = env_logger::try_init();
    let products = common::products(30);
    let layout = build_layout(&common::a4_grid(), &products).expect("layout");
    assert_eq!(layout.total_pages, 2);
    let zpl = render_zpl(&layout, &common::all_fields(), &RenderConfig::default());
    let lines: Vec<&str> = zpl.lines().collect();

    assert_eq!(lines.iter().filter(|l| **l == "^XA").count(), 1);
    assert_eq!(lines.iter().filter(|l| **l == "^XZ").count(), 1);
    assert_eq!(lines.first(), Some(&"^XA"));
    assert_eq!(lines.last(), Some(&"^XZ"));
    assert_eq!(lines.iter().filter(|l| l.contains("^GB")).count(), 30);
}

#[test]
fn zpl_format_per_page_is_opt_in() {
    let products = common::products(30);
    let layout = build_layout(&common::a4_grid(), &products).expect("layout");
    let mut config = RenderConfig::default();
    config.zpl.format_per_page = true;
    let zpl = render_zpl(&layout, &common::all_fields(), &config);
    let lines: Vec<&str> = zpl.lines().collect();

    assert_eq!(lines.iter().filter(|l| **l == "^XA").count(), 2);
    assert_eq!(lines.iter().filter(|l| **l == "^CI28").count(), 2);
    assert_eq!(lines.iter().filter(|l| **l == "^XZ").count(), 2);
    // the second format starts right after the 24th frame's fields
    let second = lines.iter().rposition(|l| *l == "^XA").expect("second ^XA");
    assert_eq!(lines[second - 1], "^XZ");
    assert_eq!(lines[second..].iter().filter(|l| l.contains("^GB")).count(), 6);
}

#[test]
fn zpl_font_heights_follow_configured_sizes() {
    let products = vec![common::product(1)];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let fields = FieldConfig {
        text_font_size: 4.0,
        price_font_size: 30.0,
        ..common::all_fields()
    };
    let zpl = render_zpl(&layout, &fields, &RenderConfig::default());
    // 4pt * 2 is below the 18 dot floor
    assert!(zpl.contains("^A0N,18,18^FB368,2,0,L,0^FDLatex Interior 1"));
    assert!(zpl.contains("^A0N,60,60^"));
}

#[test]
fn dpi_changes_thermal_coordinates() {
    let products = vec![common::product(1)];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let config = RenderConfig {
        dpi: 300,
        ..RenderConfig::default()
    };
    let tspl = render_tspl(&layout, &common::all_fields(), &config);
    assert!(tspl.contains("BOX 0,0,591,354,2"));
}

#[test]
fn missing_promo_price_is_suppressed_everywhere() {
    let products = vec![common::product(2)];
    assert!(products[0].promo_price.is_none());
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let fields = common::all_fields();
    assert!(fields.show_promo_price);
    let config = common::readable_config();

    let zpl = render_zpl(&layout, &fields, &config);
    let tspl = render_tspl(&layout, &fields, &config);
    let pdf = render_pdf(&layout, &fields, &config, &Code128Rasterizer::default()).expect("pdf");

    assert!(!zpl.contains("Promo"));
    assert!(!tspl.contains("Promo"));
    assert!(!contains(&pdf, b"Promo"));

    let with_promo = vec![common::promo_product()];
    let layout = build_layout(&common::roll_grid(), &with_promo).expect("layout");
    assert!(render_zpl(&layout, &fields, &config).contains("Promo: $ 52.999,00"));
    assert!(render_tspl(&layout, &fields, &config).contains("Promo: $ 52.999,00"));
    let pdf = render_pdf(&layout, &fields, &config, &Code128Rasterizer::default()).expect("pdf");
    assert!(common::pdf_shows(&pdf, b"Promo:"));
}

#[test]
fn empty_validity_is_suppressed() {
    let products = vec![
        Product {
            valid_until: Some(String::new()),
            ..common::product(1)
        },
        Product {
            valid_until: None,
            ..common::product(2)
        },
    ];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let config = common::readable_config();
    let fields = common::all_fields();
    assert!(!render_zpl(&layout, &fields, &config).contains("Val:"));
    assert!(!render_tspl(&layout, &fields, &config).contains("Val:"));
    let pdf = render_pdf(&layout, &fields, &config, &Code128Rasterizer::default()).expect("pdf");
    assert!(!contains(&pdf, b"Validez"));
}

#[test]
fn hidden_fields_are_not_emitted() {
    let products = vec![common::promo_product()];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let fields = FieldConfig {
        show_product_code: false,
        show_unit: false,
        show_barcode: false,
        ..common::all_fields()
    };
    let tspl = render_tspl(&layout, &fields, &RenderConfig::default());
    assert!(!tspl.contains("Cod:"));
    assert!(!tspl.contains("Unidad:"));
    assert!(!tspl.contains("BARCODE"));
    assert!(tspl.contains("BOX "));

    let zpl = render_zpl(&layout, &fields, &RenderConfig::default());
    assert!(!zpl.contains("^BC"));
    assert!(zpl.contains("^GB"));
}

#[test]
fn fields_are_emitted_in_fixed_order() {
    let products = vec![common::promo_product()];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let tspl = render_tspl(&layout, &common::all_fields(), &RenderConfig::default());
    let markers = ["BOX ", "Latex", "Cod:", "$ 58.999", "Promo:", "Unidad:", "Val:", "BARCODE"];
    let offsets: Vec<usize> = markers
        .iter()
        .map(|m| tspl.find(m).unwrap_or_else(|| panic!("missing {m}")))
        .collect();
    assert!(offsets.windows(2).all(|w| w[0] < w[1]), "{offsets:?}");
}

#[test]
fn thermal_encoders_agree_on_field_positions() {
    let products = common::products(5);
    let grid = common::a4_grid();
    let layout = build_layout(&grid, &products).expect("layout");
    let fields = common::all_fields();
    let config = RenderConfig::default();
    let zpl = render_zpl(&layout, &fields, &config);
    let tspl = render_tspl(&layout, &fields, &config);
    let positions = resolve_positions(None, &FieldLayout::default(), 50.0, 30.0);

    for cell in layout.cells() {
        let description = &cell.product.description;
        let expected_x = (cell.x + positions.description.x_mm) / 25.4 * 203.0;
        let expected_y = (cell.y + positions.description.y_mm) / 25.4 * 203.0;

        let zpl_line = zpl
            .lines()
            .find(|l| l.ends_with(&format!("^FD{description}^FS")))
            .expect("zpl description");
        let (zx, zy) = zpl_origin(zpl_line);
        assert_close(zx as f64, expected_x, 1.0);
        assert_close(zy as f64, expected_y, 1.0);

        let tspl_line = tspl
            .lines()
            .find(|l| l.ends_with(&format!("\"{description}\"")))
            .expect("tspl description");
        let coords: Vec<i64> = tspl_line["TEXT ".len()..]
            .split(',')
            .take(2)
            .map(|v| v.parse().expect("coordinate"))
            .collect();
        assert_eq!(coords, vec![zx, zy]);
    }
}

#[test]
fn pdf_frames_match_layout_in_points() {
    let products = common::products(30);
    let layout = build_layout(&common::a4_grid(), &products).expect("layout");
    let fields = FieldConfig {
        show_barcode: false,
        ..common::all_fields()
    };
    let pdf = render_pdf(&layout, &fields, &common::readable_config(), &Code128Rasterizer::default())
        .expect("pdf");

    assert!(pdf.starts_with(b"%PDF-"));
    assert_eq!(common::pdf_page_count(&pdf), 2);

    let rects = common::pdf_rects(&pdf);
    assert_eq!(rects.len(), 30);
    let page_h = mm_to_points(297.0);
    // 0.01mm in points
    let tol = mm_to_points(0.01);
    for (rect, cell) in rects.iter().zip(layout.cells()) {
        assert_close(rect[0] as f64, mm_to_points(cell.x), tol);
        assert_close(rect[1] as f64, page_h - mm_to_points(cell.y + cell.height), tol);
        assert_close(rect[2] as f64, mm_to_points(cell.width), tol);
        assert_close(rect[3] as f64, mm_to_points(cell.height), tol);
    }
}

#[test]
fn pdf_page_size_follows_orientation() {
    let products = common::products(1);
    let grid = shelf_labels::GridSpec {
        orientation: shelf_labels::Orientation::Horizontal,
        ..common::a4_grid()
    };
    let layout = build_layout(&grid, &products).expect("layout");
    let pdf = render_pdf(&layout, &common::all_fields(), &common::readable_config(), &Code128Rasterizer::default())
        .expect("pdf");
    let text = String::from_utf8_lossy(&pdf);
    let media_box = text
        .split("/MediaBox [")
        .nth(1)
        .and_then(|rest| rest.split(']').next())
        .expect("media box");
    let nums: Vec<f64> = media_box
        .split_ascii_whitespace()
        .map(|n| n.parse().expect("number"))
        .collect();
    assert_close(nums[2], mm_to_points(297.0), 0.01);
    assert_close(nums[3], mm_to_points(210.0), 0.01);
}

/// Operands of every `op` in a content stream, grouped per occurrence.
fn operands(tokens: &[&str], op: &str, arity: usize) -> Vec<Vec<f64>> {
    tokens
        .iter()
        .enumerate()
        .filter(|&(i, t)| *t == op && i >= arity)
        .map(|(i, _)| {
            tokens[i - arity..i]
                .iter()
                .map(|t| t.parse().expect("numeric operand"))
                .collect()
        })
        .collect()
}

#[test]
fn pdf_field_origins_map_back_to_millimeters() {
    let _ = env_logger::try_init();
    let products = vec![common::promo_product()];
    let grid = shelf_labels::GridSpec {
        margin_left_mm: 3.5,
        margin_top_mm: 2.25,
        page_width_mm: Some(60.0),
        page_height_mm: Some(40.0),
        ..common::roll_grid()
    };
    let layout = build_layout(&grid, &products).expect("layout");
    let fields = common::all_fields();
    let pdf = render_pdf(&layout, &fields, &common::readable_config(), &Code128Rasterizer::default())
        .expect("pdf");

    let content = common::pdf_last_stream(&pdf);
    let tokens: Vec<&str> = content.split_ascii_whitespace().collect();
    let cell = &layout.pages[0][0];
    let positions = resolve_positions(None, &FieldLayout::default(), cell.width, cell.height);
    let page_h = mm_to_points(40.0);
    let pt_per_mm = mm_to_points(1.0);

    // first Td after each BT, in emission order
    let origins: Vec<(f64, f64)> = tokens
        .iter()
        .enumerate()
        .filter(|&(_, t)| *t == "BT")
        .map(|(bt, _)| {
            let td = bt + tokens[bt..].iter().position(|t| *t == "Td").expect("Td");
            (
                tokens[td - 2].parse().expect("x"),
                tokens[td - 1].parse().expect("y"),
            )
        })
        .collect();
    let text_fields = [
        (FieldKey::Description, 10.0),
        (FieldKey::ProductCode, 9.0),
        (FieldKey::Price, 20.0),
        (FieldKey::PromoPrice, 11.0),
        (FieldKey::Unit, 9.0),
        (FieldKey::ValidUntil, 9.0),
    ];
    assert_eq!(origins.len(), text_fields.len());
    for ((x, baseline), (key, font_size)) in origins.iter().zip(text_fields) {
        let rect = positions.get(key);
        let top = baseline + font_size * 0.75;
        assert_close(x / pt_per_mm, cell.x + rect.x_mm, 0.01);
        assert_close((page_h - top) / pt_per_mm, cell.y + rect.y_mm, 0.01);
    }

    // barcode: image placed by `w 0 0 h x y cm`, top-left aligned in its box
    let placements = operands(&tokens, "cm", 6);
    assert_eq!(placements.len(), 1);
    let [w, _, _, h, x, y] = placements[0][..] else {
        panic!("cm operands: {:?}", placements[0]);
    };
    let rect = positions.get(FieldKey::Barcode);
    assert_close(x / pt_per_mm, cell.x + rect.x_mm, 0.01);
    assert_close((page_h - (y + h)) / pt_per_mm, cell.y + rect.y_mm, 0.01);
    assert!(w / pt_per_mm <= rect.width_mm + 0.01);
    assert!(h / pt_per_mm <= rect.height_mm + 0.01);

    // promo text is red, and the fill goes back to black afterwards
    let red = content.find("1 0 0 rg").expect("promo colour");
    let reset = content[red..].find("0 g").expect("fill reset");
    let promo_bt = content[red..].find("BT").expect("promo text");
    assert!(promo_bt < reset);
    assert_eq!(content.matches(" rg").count(), 1);
}

#[test]
fn pdf_rasterizes_each_distinct_barcode_once() {
    let mut products = common::products(3);
    products.push(common::product(0));
    let layout = build_layout(&common::a4_grid(), &products).expect("layout");
    let rasterizer = CountingRasterizer::default();
    let pdf = render_pdf(&layout, &common::all_fields(), &common::readable_config(), &rasterizer)
        .expect("pdf");

    assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 3);
    assert_eq!(count(&pdf, b"/Subtype /Image"), 3);
    assert_eq!(count(&pdf, b" Do"), 4);
}

#[test]
fn pdf_skips_rasterizing_hidden_barcodes() {
    let products = common::products(4);
    let layout = build_layout(&common::a4_grid(), &products).expect("layout");
    let fields = FieldConfig {
        show_barcode: false,
        ..common::all_fields()
    };
    let rasterizer = CountingRasterizer::default();
    let pdf = render_pdf(&layout, &fields, &RenderConfig::default(), &rasterizer).expect("pdf");
    assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 0);
    assert!(!contains(&pdf, b"/Subtype /Image"));
}

#[test]
fn pdf_fails_on_unencodable_barcode() {
    let products = vec![
        common::product(1),
        Product {
            barcode: "Ñandú-42".to_string(),
            ..common::product(2)
        },
    ];
    let layout = build_layout(&common::a4_grid(), &products).expect("layout");
    let err = render_pdf(&layout, &common::all_fields(), &RenderConfig::default(), &Code128Rasterizer::default())
        .expect_err("non-ASCII barcode");
    match &err {
        Error::Barcode { text, .. } => assert_eq!(text, "Ñandú-42"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Ñandú-42"));
}

#[test]
fn code_set_markers_in_barcode_values_are_rejected() {
    let rasterizer = Code128Rasterizer::default();
    for value in ["AB\u{0106}12", "\u{0181}123", "12\u{00C0}34", "tab\there"] {
        match rasterizer.modules(value) {
            Err(Error::Barcode { text, .. }) => assert_eq!(text, value),
            other => panic!("{value:?} should be rejected, got {other:?}"),
        }
    }
    assert!(rasterizer.modules("AB-12 x~").is_ok());

    let products = vec![Product {
        barcode: "AB\u{0106}12".to_string(),
        ..common::product(1)
    }];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let err = render_pdf(&layout, &common::all_fields(), &RenderConfig::default(), &rasterizer)
        .expect_err("code-set marker");
    assert!(matches!(err, Error::Barcode { ref text, .. } if text == "AB\u{0106}12"));
}

#[test]
fn pdf_text_is_clipped_to_its_box() {
    let products = vec![Product {
        description: "Revestimiento Texturado Exterior Premium Antihongos Blanco Mate 30kg".to_string(),
        ..common::product(1)
    }];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let pdf = render_pdf(&layout, &common::all_fields(), &common::readable_config(), &Code128Rasterizer::default())
        .expect("pdf");
    // 6mm box at 10pt holds one 12pt line; the rest is cut with an ellipsis (0x85)
    assert!(common::pdf_shows(&pdf, b"Revestimiento Texturado\x85"));
    assert!(!common::pdf_shows(&pdf, b"Revestimiento Texturado Exterior"));
    assert!(!contains(&pdf, b"30kg"));
}

#[test]
fn custom_positions_flow_into_every_encoder() {
    let products = vec![common::product(1)];
    let layout = build_layout(&common::roll_grid(), &products).expect("layout");
    let mut partial = PartialPositions::default();
    partial.set(
        FieldKey::Barcode,
        PartialPosition {
            x_mm: Some(5.0),
            y_mm: Some(20.0),
            ..PartialPosition::default()
        },
    );
    let fields = FieldConfig {
        positions: Some(partial),
        ..common::all_fields()
    };
    let (x, y) = (mm_to_dots(5.0, 203), mm_to_dots(20.0, 203));
    let zpl = render_zpl(&layout, &fields, &RenderConfig::default());
    assert!(zpl.contains(&format!("^FO{x},{y}^BY2^BCN,43")));
    let tspl = render_tspl(&layout, &fields, &RenderConfig::default());
    assert!(tspl.contains(&format!("BARCODE {x},{y},\"128\",43")));
}

#[test]
fn export_reports_mime_types() {
    let job = LabelJob {
        layout: common::roll_grid(),
        fields: common::all_fields(),
        products: common::products(2),
    };
    let rasterizer = Code128Rasterizer::default();
    let config = RenderConfig::default();

    let pdf = export_labels(&job, OutputFormat::Pdf, &config, &rasterizer).expect("pdf");
    assert_eq!(pdf.mime_type(), "application/pdf");
    assert!(pdf.bytes.starts_with(b"%PDF-"));

    let zpl = export_labels(&job, OutputFormat::Zpl, &config, &rasterizer).expect("zpl");
    assert_eq!(zpl.mime_type(), "text/plain");
    assert!(zpl.bytes.starts_with(b"^XA"));

    let tspl = export_labels(&job, OutputFormat::Tspl, &config, &rasterizer).expect("tspl");
    assert!(tspl.bytes.starts_with(b"SIZE 50 mm,30 mm"));

    let bad = RenderConfig {
        dpi: 0,
        ..RenderConfig::default()
    };
    assert!(matches!(
        export_labels(&job, OutputFormat::Zpl, &bad, &rasterizer),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn job_json_round_trip_through_export() {
    let job = LabelJob::from_json(
        br#"{
            "layout": {
                "labelWidthMm": 50, "labelHeightMm": 30, "pageSize": "roll",
                "pageWidthMm": 50, "pageHeightMm": 30, "columns": 1, "rows": 1,
                "marginTopMm": 0, "marginLeftMm": 0, "marginRightMm": 0, "marginBottomMm": 0,
                "gapXmm": 0, "gapYmm": 0, "orientation": "vertical"
            },
            "fields": {
                "showBarcode": true, "showProductCode": false, "showDescription": true,
                "showPrice": true, "showPromoPrice": true, "showUnit": false,
                "showValidUntil": false, "priceFontSize": 18, "textFontSize": 9
            },
            "products": [
                { "barcode": "7791234567002", "productCode": "PINT-002",
                  "description": "Esmalte Sintetico Satinado 4L", "price": 21990,
                  "promoPrice": null, "unit": "UN", "validUntil": "2026-11-30" }
            ]
        }"#,
    )
    .expect("job");
    let out = export_labels(&job, OutputFormat::Tspl, &RenderConfig::default(), &Code128Rasterizer::default())
        .expect("export");
    let tspl = String::from_utf8(out.bytes).expect("utf8");
    assert!(tspl.contains("\"$ 21.990,00\""));
    assert!(!tspl.contains("Cod:"));
    assert!(!tspl.contains("Promo"));
    assert!(tspl.contains("\"7791234567002\""));
}

#[test]
fn code128_rasterizer_produces_png() {
    let rasterizer = Code128Rasterizer::default();
    let png = rasterizer.render_png("7791234567001").expect("png");
    assert!(png.starts_with(b"\x89PNG"));

    let modules = rasterizer.modules("7791234567001").expect("modules");
    let img = image_size(&png);
    assert_eq!(img, ((modules.len() as u32 + 20) * 2, 50));

    assert!(matches!(rasterizer.render_png(""), Err(Error::Barcode { .. })));
}

/// Width and height from a PNG IHDR chunk.
fn image_size(png: &[u8]) -> (u32, u32) {
    let w = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
    let h = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
    (w, h)
}
