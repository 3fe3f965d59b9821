use evscript_formatter::{FormatError, Formatter, FormatterConfig, LabelDisambiguation};
use evscript_ir::{
    Arg, Cond, Emedf, EventFunction, EventId, GotoTarget, Instr, InstrId, Intermediate,
    IntermediateKind, IrError, LineMapping, RestBehavior, passes,
};
use rstest::{fixture, rstest};
use tracing_subscriber::EnvFilter;

#[fixture]
fn formatter() -> Formatter {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("evscript_formatter=debug")),
        )
        .with_test_writer()
        .try_init();

    Formatter::default()
}

fn flag(id: i64) -> Cond {
    Cond::cmd("EventFlag", vec![Arg::Int(id)])
}

fn instr(name: &str) -> Intermediate {
    Intermediate::instr(name, Vec::new())
}

fn event(id: i64, body: Vec<Intermediate>) -> EventFunction {
    EventFunction::new(EventId::Num(id), RestBehavior::Default).with_body(body)
}

#[rstest]
fn test_resolved_skip_is_printed_as_label(formatter: Formatter) {
    let mut func = event(
        100,
        vec![
            Intermediate::goto(GotoTarget::SkipLines(1), flag(5)),
            instr("A"),
            instr("B"),
        ],
    );
    passes::resolve_jumps(&mut func).unwrap();

    let text = formatter.format_function(&func).unwrap().text;

    assert_eq!(
        text,
        "Event(100, Default, function() {\n    GotoIf(skip, EventFlag(5));\n    A();\nskip:\n    B();\n});\n"
    );
}

#[rstest]
fn test_skip_to_end_of_body_prints_noop(formatter: Formatter) {
    let mut func = event(
        100,
        vec![Intermediate::goto(GotoTarget::SkipLines(1), flag(5)), instr("A")],
    );
    passes::resolve_jumps(&mut func).unwrap();

    let text = formatter.format_function(&func).unwrap().text;

    assert!(text.ends_with("    A();\nskip:\n    NoOp();\n});\n"), "{}", text);
}

#[rstest]
fn test_resolved_node_goto_is_printed_as_label(formatter: Formatter) {
    let mut func = event(
        100,
        vec![
            Intermediate::goto(GotoTarget::Node(2), Cond::always()),
            instr("A").with_id(1),
            instr("B").with_id(2),
        ],
    );
    passes::resolve_jumps(&mut func).unwrap();

    let text = formatter.format_function(&func).unwrap().text;

    assert_eq!(
        text,
        "Event(100, Default, function() {\n    Goto(label);\n    A();\nlabel:\n    B();\n});\n"
    );
}

#[rstest]
fn test_unresolved_reference_is_reported(formatter: Formatter) {
    let formatter = Formatter::new(Some(FormatterConfig {
        verify_references: true,
        ..formatter.config().clone()
    }));
    let func = event(
        100,
        vec![Intermediate::goto(GotoTarget::Label("L4".into()), flag(1))],
    );

    let err = formatter.format_function(&func).unwrap_err();

    assert!(matches!(err, FormatError::Ir(IrError::UnresolvedLabel { .. })), "{:?}", err);
}

#[rstest]
fn test_catalog_instructions_print_enum_names(formatter: Formatter) {
    let catalog = Emedf::from_json_str(
        r#"{
            "main_classes": [
                {"name": "System", "index": 3, "instrs": [
                    {"name": "IfEventFlag", "index": 0, "args": [
                        {"name": "Result", "type": 0, "enum_name": null, "default": 0, "min": 0, "max": 1, "increment": 1},
                        {"name": "State", "type": 0, "enum_name": "ON/OFF", "default": 0, "min": 0, "max": 1, "increment": 1}
                    ]}
                ]}
            ],
            "enums": [{"name": "ON/OFF", "values": {"0": "OFF", "1": "ON"}}]
        }"#,
    )
    .unwrap();

    let func = event(
        100,
        vec![
            Intermediate::new(IntermediateKind::Instr(Instr::from_catalog(
                &catalog,
                InstrId::new(3, 0),
                vec![Arg::Int(0), Arg::Int(1)],
                None,
            ))),
            Intermediate::new(IntermediateKind::Instr(Instr::from_catalog(
                &catalog,
                InstrId::new(2003, 4),
                vec![Arg::Int(9)],
                None,
            ))),
        ],
    );

    let text = formatter.format_function(&func).unwrap().text;

    assert!(text.contains("    IfEventFlag(0, ON/OFF.ON);\n"), "{}", text);
    assert!(text.contains("    Unknown200304(9);\n"), "{}", text);
}

#[rstest]
fn test_mappings_across_functions(formatter: Formatter) {
    let funcs = vec![
        event(0, vec![instr("A").with_line_mapping(LineMapping::single(2))]),
        event(1, vec![instr("B").with_line_mapping(LineMapping::single(6))]),
    ];

    let rendered = formatter.format_functions(&funcs).unwrap();

    assert_eq!(rendered.mappings.len(), 2);
    assert_eq!(rendered.mappings[0].printed_line, 2);
    assert_eq!(rendered.mappings[1].printed_line, 6);
    assert_eq!(rendered.source_line_for(6), Some(6));
    assert_eq!(rendered.source_line_for(1), None);
}

#[rstest]
#[case::never(LabelDisambiguation::Never, "L0:\n")]
#[case::always(LabelDisambiguation::Always, "L0_:\n")]
fn test_label_disambiguation_from_toml(
    formatter: Formatter,
    #[case] mode: LabelDisambiguation,
    #[case] second: &str,
) {
    let toml = match &mode {
        LabelDisambiguation::Never => "label_disambiguation = \"never\"",
        _ => "label_disambiguation = \"always\"",
    };
    let config = FormatterConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.label_disambiguation, mode);
    assert_eq!(config.column_limit, formatter.config().column_limit);

    let func = event(
        5,
        vec![
            Intermediate::label(0),
            instr("A"),
            Intermediate::if_else(flag(1), vec![Intermediate::label(0), instr("B")], vec![]),
        ],
    );
    let text = Formatter::new(Some(config)).format_function(&func).unwrap().text;

    assert_eq!(text.matches("L0").count(), 2);
    assert!(text.ends_with("B();\n    }\n});\n"));
    assert!(text.rsplit_once("{\n").unwrap().1.starts_with(second), "{}", text);
}
