//! Integration tests for form mode: documents with an AcroForm.

mod common;

use common::{
    acroform, appearance_text, blank_pdf, form_field, form_pdf, name_value, page_operations,
    string_value, text_positions,
};
use lopdf::Object;
use pdffill::{
    FieldDefinition, FieldKind, FieldValue, FieldValues, FillMode, FillOptions, FillWarningCode,
    Filler, FormFieldKind, Point, Size, fill, form_fields,
};

fn values(pairs: &[(&str, FieldValue)]) -> FieldValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn lists_form_fields() {
    let fields = form_fields(&form_pdf()).unwrap();
    let summary: Vec<(&str, FormFieldKind)> =
        fields.iter().map(|f| (f.name.as_str(), f.kind)).collect();
    assert_eq!(
        summary,
        vec![
            ("vorname", FormFieldKind::Text),
            ("hasKids", FormFieldKind::Checkbox),
            ("land", FormFieldKind::Dropdown),
            ("drucken", FormFieldKind::PushButton),
        ]
    );

    let land = &fields[2];
    assert_eq!(land.options, vec!["CH", "DE"]);
    assert_eq!(land.page_index, Some(0));
    let vorname = &fields[0];
    let bbox = vorname.bbox.unwrap();
    assert_eq!(bbox.x0, 150.0);
    assert_eq!(bbox.top, 665.0);
}

#[test]
fn document_without_form_lists_nothing() {
    assert!(form_fields(&blank_pdf(1, 595, 842)).unwrap().is_empty());
}

#[test]
fn text_field_value_is_set() {
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("vorname", "Maria".into())]), &[])
        .unwrap();

    let field = form_field(&filled.bytes, "vorname");
    assert_eq!(string_value(&field, b"V").as_deref(), Some("Maria"));
    assert_eq!(filled.report.count(FillMode::Form), 1);
    assert_eq!(filled.report.filled[0].page, Some(0));
    // Nothing is drawn on the page in form mode.
    assert!(page_operations(&filled.bytes, 0).is_empty());
}

#[test]
fn form_fill_requests_appearance_regeneration() {
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("vorname", "Maria".into())]), &[])
        .unwrap();
    assert_eq!(
        acroform(&filled.bytes).get(b"NeedAppearances").unwrap(),
        &Object::Boolean(true)
    );
}

#[test]
fn untouched_form_keeps_appearance_flag_unset() {
    let filled = Filler::default()
        .fill(&form_pdf(), &FieldValues::new(), &[])
        .unwrap();
    assert!(acroform(&filled.bytes).get(b"NeedAppearances").is_err());
}

#[test]
fn text_field_gets_its_own_appearance() {
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("vorname", "Maria".into())]), &[])
        .unwrap();
    assert_eq!(
        appearance_text(&filled.bytes, "vorname"),
        Some(b"Maria".to_vec())
    );
    assert_eq!(
        acroform(&filled.bytes).get(b"NeedAppearances").unwrap(),
        &Object::Boolean(true)
    );
}

#[test]
fn empty_values_leave_the_form_untouched() {
    let filled = Filler::default()
        .fill(
            &form_pdf(),
            &values(&[("vorname", FieldValue::Null), ("hasKids", "".into())]),
            &[],
        )
        .unwrap();

    let vorname = form_field(&filled.bytes, "vorname");
    assert!(vorname.get(b"V").is_err());
    assert!(vorname.get(b"AP").is_err());
    let has_kids = form_field(&filled.bytes, "hasKids");
    assert_eq!(name_value(&has_kids, b"V").as_deref(), Some("Off"));
    assert_eq!(name_value(&has_kids, b"AS").as_deref(), Some("Off"));

    assert!(acroform(&filled.bytes).get(b"NeedAppearances").is_err());
    assert_eq!(filled.report.skipped_empty, vec!["hasKids", "vorname"]);
    assert!(filled.report.filled.is_empty());
    assert!(filled.report.warnings.is_empty());
}

#[test]
fn refilling_a_form_is_stable() {
    let input = values(&[
        ("vorname", "Maria".into()),
        ("hasKids", true.into()),
        ("land", "de".into()),
    ]);
    let filler = Filler::default();
    let first = filler.fill(&form_pdf(), &input, &[]).unwrap();
    let second = filler.fill(&first.bytes, &input, &[]).unwrap();

    for name in ["vorname", "land"] {
        assert_eq!(
            string_value(&form_field(&first.bytes, name), b"V"),
            string_value(&form_field(&second.bytes, name), b"V"),
        );
        assert_eq!(
            appearance_text(&first.bytes, name),
            appearance_text(&second.bytes, name),
        );
    }
    let kids_first = form_field(&first.bytes, "hasKids");
    let kids_second = form_field(&second.bytes, "hasKids");
    assert_eq!(name_value(&kids_first, b"V"), name_value(&kids_second, b"V"));
    assert_eq!(name_value(&kids_first, b"AS"), name_value(&kids_second, b"AS"));
    assert_eq!(name_value(&kids_second, b"AS").as_deref(), Some("Yes"));

    assert_eq!(first.report, second.report);
    assert_eq!(second.report.count(FillMode::Form), 3);
}

#[test]
fn checkbox_is_checked_with_its_on_state() {
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("hasKids", true.into())]), &[])
        .unwrap();
    let field = form_field(&filled.bytes, "hasKids");
    assert_eq!(name_value(&field, b"V").as_deref(), Some("Yes"));
    assert_eq!(name_value(&field, b"AS").as_deref(), Some("Yes"));
}

#[test]
fn falsy_checkbox_is_unchecked() {
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("hasKids", "no".into())]), &[])
        .unwrap();
    let field = form_field(&filled.bytes, "hasKids");
    assert_eq!(name_value(&field, b"V").as_deref(), Some("Off"));
    assert_eq!(name_value(&field, b"AS").as_deref(), Some("Off"));
    assert!(filled.report.was_filled("hasKids"));
}

#[test]
fn dropdown_matches_option_case_insensitively() {
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("land", "de".into())]), &[])
        .unwrap();
    let field = form_field(&filled.bytes, "land");
    assert_eq!(string_value(&field, b"V").as_deref(), Some("DE"));
}

#[test]
fn dropdown_without_matching_option_is_a_warning() {
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("land", "Frankreich".into())]), &[])
        .unwrap();
    let field = form_field(&filled.bytes, "land");
    assert!(field.get(b"V").is_err());

    let warning = &filled.report.warnings[0];
    assert_eq!(warning.code, FillWarningCode::OptionNotFound);
    assert_eq!(warning.field_name, "land");
    assert!(filled.report.filled.is_empty());
}

#[test]
fn field_names_match_case_insensitively() {
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("VORNAME", "Maria".into())]), &[])
        .unwrap();
    let field = form_field(&filled.bytes, "vorname");
    assert_eq!(string_value(&field, b"V").as_deref(), Some("Maria"));
}

#[test]
fn unknown_field_leaves_form_untouched() {
    let pdf = form_pdf();
    let filled = Filler::default()
        .fill(&pdf, &values(&[("unknownField", "x".into())]), &[])
        .unwrap();

    let warnings: Vec<_> = filled
        .report
        .warnings_with(FillWarningCode::FieldNotFound)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(filled.report.filled.is_empty());
    for name in ["vorname", "land"] {
        assert!(form_field(&filled.bytes, name).get(b"V").is_err());
    }
}

#[test]
fn push_button_without_definition_is_unsupported() {
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("drucken", "x".into())]), &[])
        .unwrap();
    let warning = &filled.report.warnings[0];
    assert_eq!(warning.code, FillWarningCode::UnsupportedFieldType);
    assert_eq!(warning.page, Some(0));
}

#[test]
fn push_button_with_definition_falls_back_to_overlay() {
    let def = FieldDefinition::new(
        "drucken",
        FieldKind::Text,
        Point::new(50.0, 322.0),
        Size::new(50.0, 20.0),
    );
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("drucken", "x".into())]), &[def])
        .unwrap();

    assert!(filled.report.warnings.is_empty());
    assert_eq!(filled.report.count(FillMode::Overlay), 1);
    assert_eq!(text_positions(&filled.bytes, 0), vec![(50.0, 500.0)]);
}

#[test]
fn form_and_overlay_mix_in_one_call() {
    let def = FieldDefinition::new(
        "bemerkung",
        FieldKind::Text,
        Point::new(50.0, 100.0),
        Size::new(300.0, 20.0),
    );
    let filled = Filler::default()
        .fill(
            &form_pdf(),
            &values(&[("vorname", "Maria".into()), ("bemerkung", "keine".into())]),
            &[def],
        )
        .unwrap();

    assert_eq!(filled.report.count(FillMode::Form), 1);
    assert_eq!(filled.report.count(FillMode::Overlay), 1);
    assert_eq!(text_positions(&filled.bytes, 0), vec![(50.0, 722.0)]);
}

#[test]
fn form_field_wins_over_definition() {
    let def = FieldDefinition::new(
        "vorname",
        FieldKind::Text,
        Point::new(150.0, 665.0),
        Size::new(200.0, 20.0),
    );
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("vorname", "Maria".into())]), &[def])
        .unwrap();
    assert!(page_operations(&filled.bytes, 0).is_empty());
    assert_eq!(filled.report.filled[0].mode, FillMode::Form);
}

#[test]
fn overlay_only_ignores_the_form() {
    let def = FieldDefinition::new(
        "vorname",
        FieldKind::Text,
        Point::new(150.0, 665.0),
        Size::new(200.0, 20.0),
    );
    let filled = Filler::new(FillOptions::default().overlay_only())
        .fill(&form_pdf(), &values(&[("vorname", "Maria".into())]), &[def])
        .unwrap();

    assert!(form_field(&filled.bytes, "vorname").get(b"V").is_err());
    assert_eq!(text_positions(&filled.bytes, 0), vec![(150.0, 157.0)]);
}

#[test]
fn locking_sets_read_only_flag() {
    let filled = Filler::new(FillOptions::default().lock_filled_fields(true))
        .fill(
            &form_pdf(),
            &values(&[("vorname", "Maria".into()), ("land", "CH".into())]),
            &[],
        )
        .unwrap();

    let vorname = form_field(&filled.bytes, "vorname");
    assert_eq!(vorname.get(b"Ff").unwrap().as_i64().unwrap(), 1);
    let land = form_field(&filled.bytes, "land");
    assert_eq!(land.get(b"Ff").unwrap().as_i64().unwrap(), (1 << 17) | 1);

    let fields = form_fields(&filled.bytes).unwrap();
    assert!(fields.iter().find(|f| f.name == "vorname").unwrap().is_read_only());
}

#[test]
fn fields_are_not_locked_by_default() {
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("vorname", "Maria".into())]), &[])
        .unwrap();
    assert!(form_field(&filled.bytes, "vorname").get(b"Ff").is_err());
}

#[test]
fn convenience_fill_sets_form_values() {
    let bytes = fill(
        &form_pdf(),
        &values(&[("vorname", "Maria".into()), ("hasKids", "yes".into())]),
        None,
        None,
    )
    .unwrap();

    let fields = form_fields(&bytes).unwrap();
    let value_of = |name: &str| {
        fields
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.value.clone())
    };
    assert_eq!(value_of("vorname").as_deref(), Some("Maria"));
    assert_eq!(value_of("hasKids").as_deref(), Some("Yes"));
}

#[test]
fn non_ascii_text_round_trips_through_the_form() {
    let filled = Filler::default()
        .fill(&form_pdf(), &values(&[("vorname", "Zoë".into())]), &[])
        .unwrap();
    let fields = form_fields(&filled.bytes).unwrap();
    assert_eq!(fields[0].value.as_deref(), Some("Zoë"));
}
