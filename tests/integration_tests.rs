use ql_lang::{
    BASE_TABLE, Database, EvaluationFault, ExpressionError, LexError, QueryError, Value, evaluate,
    parse_expression,
    ast::BinOp,
    cli::{AstFormat, CheckOptions, CheckResult, CliError, execute_check, list_tokens, show_ast},
};
use serde_json::json;

/// A host entity shaped like a node of some foreign syntax tree.
#[derive(Debug, Clone, PartialEq)]
struct Operation {
    op: &'static str,
    code: &'static str,
    arity: i64,
    pure: bool,
}

fn operation(op: &'static str, code: &'static str, arity: i64, pure: bool) -> Operation {
    Operation {
        op,
        code,
        arity,
        pure,
    }
}

fn operations() -> Database<Operation> {
    let mut db = Database::new(vec![
        operation("+", "add", 2, true),
        operation("-", "sub", 2, true),
        operation("!", "not", 1, true),
        operation("call", "it's", 3, false),
        operation("-", "neg", 1, true),
    ]);
    db.base_table_mut()
        .define("op", |o: &Operation| Value::from(o.op))
        .define("code", |o: &Operation| Value::from(o.code))
        .define("arity", |o: &Operation| Value::Int(o.arity))
        .define("pure", |o: &Operation| Value::Bool(o.pure));
    db
}

fn numbers() -> Database<String> {
    let mut db = Database::new((0..50).map(|i| i.to_string()));
    db.base_table_mut()
        .define("num", |s: &String| Value::Int(s.parse().unwrap_or(0)));
    db.add_table(BASE_TABLE, "EvenNumber", &[], |s: &String| {
        let n: i64 = s.parse().unwrap_or(0);
        (n % 2 == 0).then(Vec::new)
    })
    .unwrap();
    db
}

fn nums(db: &Database<String>, query: &str) -> Vec<i64> {
    db.query(query)
        .unwrap()
        .into_iter()
        .map(|s| s.parse().unwrap())
        .collect()
}

fn codes(db: &Database<Operation>, query: &str) -> Vec<&'static str> {
    db.query(query).unwrap().into_iter().map(|o| o.code).collect()
}

fn fault<T: std::fmt::Debug>(db: &Database<T>, query: &str) -> EvaluationFault {
    match db.query(query) {
        Err(QueryError::Evaluation(fault)) => fault,
        other => panic!("Expected evaluation fault for {:?}, got {:?}", query, other),
    }
}

// ============================================================================
// Select statements
// ============================================================================

#[test]
fn test_even_numbers_above_forty() {
    let db = numbers();
    assert_eq!(
        nums(&db, "select EvenNumber n where n.num > 40"),
        vec![42, 44, 46, 48]
    );
}

#[test]
fn test_no_where_clause_returns_every_row_in_order() {
    let db = numbers();
    let all = nums(&db, "select Entity e");
    assert_eq!(all, (0..50).collect::<Vec<i64>>());
    assert_eq!(nums(&db, "select EvenNumber n").len(), 25);
}

#[test]
fn test_trailing_where_returns_every_row() {
    let db = numbers();
    assert_eq!(nums(&db, "select EvenNumber n where").len(), 25);
    assert_eq!(nums(&db, "  select EvenNumber n where   ").len(), 25);
}

#[test]
fn test_bare_variable_selects_every_row() {
    let db = numbers();
    assert_eq!(nums(&db, "select EvenNumber n where n").len(), 25);
}

#[test]
fn test_multiline_where_clause() {
    let db = numbers();
    assert_eq!(
        nums(&db, "select EvenNumber n\nwhere n.num > 44 and n.num < 48"),
        vec![46]
    );
}

#[test]
fn test_unknown_table() {
    let db = numbers();
    assert_eq!(
        db.query("select OddNumber n where n.num > 1"),
        Err(QueryError::TableNotFound("OddNumber".into()))
    );
}

#[test]
fn test_unknown_table_reported_before_clause_is_parsed() {
    let db = numbers();
    assert_eq!(
        db.query("select OddNumber n where )"),
        Err(QueryError::TableNotFound("OddNumber".into()))
    );
    assert!(matches!(
        db.query("select EvenNumber n where )"),
        Err(QueryError::Expression(ExpressionError::Parse(_)))
    ));
}

#[test]
fn test_where_cannot_be_the_variable() {
    let db = numbers();
    assert!(matches!(
        db.query("select Entity where"),
        Err(QueryError::Syntax(_))
    ));
}

#[test]
fn test_malformed_statement() {
    let db = numbers();
    for query in ["select Entity", "select Entity e f", "Entity e", "select Ent-ity e"] {
        assert!(
            matches!(db.query(query), Err(QueryError::Syntax(_))),
            "Failed for query: {}",
            query
        );
    }
}

#[test]
fn test_where_clause_that_does_not_tokenize() {
    let db = numbers();
    assert_eq!(
        db.query("select Entity e where e.num = 1"),
        Err(QueryError::Expression(ExpressionError::Lex(
            LexError::UnexpectedChar { ch: '=', offset: 6 }
        )))
    );
}

#[test]
fn test_where_clause_that_does_not_parse() {
    let db = numbers();
    let err = db.query("select Entity e where e.num >").unwrap_err();
    assert!(matches!(err, QueryError::Expression(ExpressionError::Parse(_))));
    assert_eq!(err.to_string(), "fail to parse: unexpected end of input at 7");
}

// ============================================================================
// Conditions
// ============================================================================

#[test]
fn test_integer_comparisons() {
    let db = numbers();
    assert_eq!(nums(&db, "select EvenNumber n where n.num >= 46"), vec![46, 48]);
    assert_eq!(nums(&db, "select EvenNumber n where n.num <= 2"), vec![0, 2]);
    assert_eq!(nums(&db, "select EvenNumber n where n.num < 3"), vec![0, 2]);
    assert_eq!(nums(&db, "select EvenNumber n where n.num == 8"), vec![8]);
    assert_eq!(nums(&db, "select Entity e where e.num != 0").len(), 49);
}

#[test]
fn test_literal_on_the_left() {
    let db = numbers();
    assert_eq!(nums(&db, "select EvenNumber n where 4 > n.num"), vec![0, 2]);
}

#[test]
fn test_fractional_literal_reads_as_zero() {
    let db = numbers();
    assert_eq!(nums(&db, "select Entity e where e.num == 0.5"), vec![0]);
}

#[test]
fn test_and_narrows_sequentially() {
    let db = numbers();
    assert_eq!(
        nums(&db, "select EvenNumber n where n.num > 10 and n.num < 16"),
        vec![12, 14]
    );
    assert_eq!(
        nums(&db, "select EvenNumber n where n.num > 10 && n.num < 16"),
        vec![12, 14]
    );
}

#[test]
fn test_or_is_an_ordered_union() {
    let db = numbers();
    // Left matches first, then right matches not already present.
    assert_eq!(
        nums(&db, "select EvenNumber n where n.num == 48 or n.num < 4"),
        vec![48, 0, 2]
    );
    assert_eq!(
        nums(&db, "select EvenNumber n where n.num < 4 || n.num < 6"),
        vec![0, 2, 4]
    );
}

#[test]
fn test_not_is_a_complement() {
    let db = numbers();
    assert_eq!(
        nums(&db, "select EvenNumber n where !(n.num > 10)"),
        vec![0, 2, 4, 6, 8, 10]
    );
    assert!(nums(&db, "select EvenNumber n where !n").is_empty());
}

#[test]
fn test_string_equality() {
    let db = operations();
    assert_eq!(codes(&db, "select Entity e where e.op == '-'"), vec!["sub", "neg"]);
    assert_eq!(
        codes(&db, "select Entity e where e.op == '-' and e.code != 'sub'"),
        vec!["neg"]
    );
}

#[test]
fn test_escaped_quote_in_literal() {
    let db = operations();
    assert_eq!(codes(&db, r"select Entity e where e.code == 'it\'s'"), vec!["it's"]);
}

#[test]
fn test_string_ordering_is_undefined() {
    let db = operations();
    assert_eq!(
        fault(&db, "select Entity e where e.code < 'b'"),
        EvaluationFault::UndefinedOperator {
            op: "<",
            kind: "string"
        }
    );
}

#[test]
fn test_bool_comparison_is_undefined() {
    let db = operations();
    assert_eq!(
        fault(&db, "select Entity e where e.pure == e.pure"),
        EvaluationFault::UndefinedOperator {
            op: "==",
            kind: "bool"
        }
    );
}

#[test]
fn test_kind_mismatch() {
    let db = numbers();
    let err = db.query("select Entity e where e.num == '3'").unwrap_err();
    assert_eq!(
        err,
        QueryError::Evaluation(EvaluationFault::TypeMismatch {
            op: BinOp::Equal,
            lhs: "int",
            rhs: "string"
        })
    );
    assert_eq!(err.to_string(), "evaluation failed: cannot compare int == string");
}

#[test]
fn test_unbound_identifier() {
    let db = numbers();
    assert_eq!(
        fault(&db, "select Entity e where x.num > 1"),
        EvaluationFault::UnboundIdentifier {
            name: "x".into(),
            var: "e".into()
        }
    );
    assert_eq!(
        fault(&db, "select Entity e where x"),
        EvaluationFault::UnboundIdentifier {
            name: "x".into(),
            var: "e".into()
        }
    );
}

#[test]
fn test_undefined_getter() {
    let db = operations();
    assert_eq!(
        fault(&db, "select Entity e where e.lhs == 'x'"),
        EvaluationFault::UndefinedGetter {
            table: "Entity".into(),
            key: "lhs".into()
        }
    );
}

#[test]
fn test_fault_with_no_candidates_still_raised() {
    let db = numbers();
    assert!(matches!(
        fault(&db, "select Entity e where e.num > 100 and e.missing == 1"),
        EvaluationFault::UndefinedGetter { .. }
    ));
}

#[test]
fn test_unsupported_shapes() {
    let db = operations();
    assert_eq!(
        fault(&db, "select Entity e where e.arity"),
        EvaluationFault::Unsupported {
            kind: "selector",
            position: "condition"
        }
    );
    assert_eq!(
        fault(&db, "select Entity e where e.arity + 1 > 2"),
        EvaluationFault::Unsupported {
            kind: "binary",
            position: "value"
        }
    );
    assert_eq!(
        fault(&db, "select Entity e where -e"),
        EvaluationFault::UndefinedOperator {
            op: "-",
            kind: "conditions"
        }
    );
    assert_eq!(
        fault(&db, "select Entity e where .op == '+'"),
        EvaluationFault::InvalidSelectorTarget("missing")
    );
    assert_eq!(
        fault(&db, "select Entity e where e.op.code == '+'"),
        EvaluationFault::InvalidSelectorTarget("selector")
    );
}

#[test]
fn test_evaluate_against_a_foreign_collection() {
    let db = operations();
    let filter = parse_expression("e.arity > 1").unwrap();

    let empty: Vec<Operation> = Vec::new();
    assert_eq!(
        evaluate(db.base_table(), &empty, "e", Some(&filter)),
        Err(EvaluationFault::MissingEntity {
            table: "Entity".into(),
            id: 0
        })
    );

    let rows = evaluate(db.base_table(), db.entities(), "e", Some(&filter)).unwrap();
    assert_eq!(rows.len(), 3);
}

// ============================================================================
// Tables
// ============================================================================

#[test]
fn test_duplicate_table_name() {
    let mut db = numbers();
    let err = db
        .add_table(BASE_TABLE, "EvenNumber", &[], |_| Some(Vec::new()))
        .unwrap_err();
    assert_eq!(err, QueryError::TableExists("EvenNumber".into()));
    assert_eq!(db.get_table("EvenNumber").unwrap().len(), 25);
}

#[test]
fn test_derive_from_unknown_table() {
    let mut db = numbers();
    assert_eq!(
        db.add_table("Missing", "Other", &[], |_| Some(Vec::new()))
            .unwrap_err(),
        QueryError::TableNotFound("Missing".into())
    );
}

#[test]
fn test_derivation_only_narrows() {
    let mut db = numbers();
    db.add_table("EvenNumber", "Tens", &[], |s: &String| {
        s.ends_with('0').then(Vec::new)
    })
    .unwrap();

    let base = db.base_table();
    let even = db.get_table("EvenNumber").unwrap();
    let tens = db.get_table("Tens").unwrap();
    assert!(even.records().iter().all(|r| base.contains(r.id())));
    assert!(tens.records().iter().all(|r| even.contains(r.id())));

    let ids: Vec<usize> = tens.records().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![0, 10, 20, 30, 40]);
    assert_eq!(nums(&db, "select Tens t where t.num > 15"), vec![20, 30, 40]);
}

#[test]
fn test_inline_values_go_through_the_pool() {
    let mut db = numbers();
    db.add_table("EvenNumber", "Labelled", &["label", "parity"], |s: &String| {
        Some(vec![format!("{}_string", s), "even".to_string()])
    })
    .unwrap();

    let table = db.get_table("Labelled").unwrap();
    assert_eq!(table.fields(), ["label", "parity"]);
    assert_eq!(table.field_index("parity"), Some(1));
    assert_eq!(table.field_index("missing"), None);

    let record = table.record(4).unwrap();
    assert_eq!(db.record_values(record), vec!["4_string", "even"]);
    assert!(table.record(5).is_none());

    // 25 distinct labels plus a single shared "even".
    assert_eq!(db.strings().len(), 26);
    let even = db.strings().lookup("even").unwrap();
    assert!(table.records().iter().all(|r| r.values()[1] == even));

    assert_eq!(db.entity(record.id()).map(String::as_str), Some("4"));
    assert_eq!(db.string(even), Some("even"));
    assert_eq!(db.intern("even"), even);
    assert_eq!(db.strings().len(), 26);
}

#[test]
fn test_tables_in_creation_order() {
    let db = numbers();
    let names: Vec<&str> = db.tables().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec![BASE_TABLE, "EvenNumber"]);
}

#[test]
fn test_getters_are_copied_at_derivation() {
    let mut db = Database::new(vec![1i64, 2, 3]);
    db.add_table(BASE_TABLE, "All", &[], |_| Some(Vec::new()))
        .unwrap();
    db.base_table_mut().define("v", |n: &i64| Value::Int(*n));

    assert_eq!(db.query("select Entity x where x.v > 1").unwrap(), vec![&2, &3]);
    assert_eq!(
        db.query("select All x where x.v > 1"),
        Err(QueryError::Evaluation(EvaluationFault::UndefinedGetter {
            table: "All".into(),
            key: "v".into()
        }))
    );

    db.get_table_mut("All")
        .unwrap()
        .define("v", |n: &i64| Value::Int(*n * 10));
    assert_eq!(db.query("select All x where x.v > 15").unwrap(), vec![&2, &3]);
}

#[test]
fn test_redefining_a_getter_replaces_it() {
    let mut db = operations();
    db.base_table_mut()
        .define("arity", |o: &Operation| Value::Int(o.arity * 2));
    assert_eq!(codes(&db, "select Entity e where e.arity == 6"), vec!["it's"]);
}

#[test]
fn test_derived_table_inherits_getters() {
    let mut db = operations();
    db.add_table(BASE_TABLE, "Impure", &[], |o: &Operation| {
        (!o.pure).then(Vec::new)
    })
    .unwrap();
    assert_eq!(
        db.get_table("Impure").unwrap().getter_names(),
        vec!["arity", "code", "op", "pure"]
    );
    assert_eq!(codes(&db, "select Impure i where i.arity > 0"), vec!["it's"]);
}

#[test]
fn test_empty_database() {
    let db: Database<String> = Database::new(Vec::new());
    assert!(db.base_table().is_empty());
    assert!(db.query("select Entity e where e.num > 1").is_err());
    assert!(db.query("select Entity e").unwrap().is_empty());
}

// ============================================================================
// CLI
// ============================================================================

fn people() -> String {
    json!([
        {"name": "ann", "age": 31},
        {"name": "bob", "age": 25},
        {"name": "cy", "age": 40, "admin": true},
    ])
    .to_string()
}

#[test]
fn test_check_filters_json_array() {
    let options = CheckOptions {
        query: "select Entity e where e.age > 30".into(),
        input: Some(people()),
        ..Default::default()
    };
    match execute_check(&options).unwrap() {
        CheckResult::Success(out) => assert_eq!(
            serde_json::from_str::<serde_json::Value>(&out).unwrap(),
            json!([
                {"name": "ann", "age": 31},
                {"name": "cy", "age": 40, "admin": true},
            ])
        ),
        other => panic!("Expected success, got {:?}", other),
    }
}

#[test]
fn test_check_missing_key_reads_as_zero_value() {
    let options = CheckOptions {
        query: "select Entity e where !(e.name == 'cy') and e.name != ''".into(),
        input: Some(people()),
        ..Default::default()
    };
    match execute_check(&options).unwrap() {
        CheckResult::Success(out) => {
            let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
            assert_eq!(rows.as_array().unwrap().len(), 2);
        }
        other => panic!("Expected success, got {:?}", other),
    }
}

#[test]
fn test_check_honours_pretty() {
    let mut options = CheckOptions {
        query: "select Entity e where e.name == 'bob'".into(),
        input: Some(people()),
        ..Default::default()
    };
    match execute_check(&options).unwrap() {
        CheckResult::Success(out) => assert_eq!(out, r#"[{"age":25,"name":"bob"}]"#),
        other => panic!("Expected success, got {:?}", other),
    }

    options.pretty = true;
    match execute_check(&options).unwrap() {
        CheckResult::Success(out) => {
            assert!(out.starts_with("[\n  {\n"));
            assert!(out.contains("    \"name\": \"bob\""));
        }
        other => panic!("Expected success, got {:?}", other),
    }
}

#[test]
fn test_check_syntax_only() {
    let options = CheckOptions {
        query: "select Entity e where e.age > 30".into(),
        syntax_only: true,
        ..Default::default()
    };
    assert!(matches!(execute_check(&options), Ok(CheckResult::SyntaxValid)));
}

#[test]
fn test_check_errors() {
    let mut options = CheckOptions {
        query: "select Entity e".into(),
        ..Default::default()
    };
    assert!(matches!(execute_check(&options), Err(CliError::NoInput)));

    options.input = Some("{\"a\": 1}".into());
    assert!(matches!(
        execute_check(&options),
        Err(CliError::NotAnArray("object"))
    ));

    options.input = Some("[1,".into());
    assert!(matches!(execute_check(&options), Err(CliError::Json(_))));

    options.input = Some(people());
    options.query = "select People p".into();
    assert!(matches!(
        execute_check(&options),
        Err(CliError::Query(QueryError::TableNotFound(_)))
    ));
}

#[test]
fn test_list_tokens() {
    assert_eq!(
        list_tokens("n.x").unwrap(),
        vec![
            "ident \"n\" 0..1",
            "op \".\" 1..2",
            "ident \"x\" 2..3",
            "eof \"\" 3..3"
        ]
    );
    assert!(matches!(list_tokens(""), Err(CliError::Expression(_))));
}

#[test]
fn test_show_ast() {
    assert_eq!(show_ast("1 + 2", AstFormat::Sexpr, false).unwrap(), "(+ 1 2)");
    assert_eq!(
        show_ast("1 + 2", AstFormat::Json, false).unwrap(),
        r#"{"lhs":{"text":"1","type":"number"},"op":"+","rhs":{"text":"2","type":"number"},"type":"binary"}"#
    );
    assert!(matches!(
        show_ast("1 +", AstFormat::Sexpr, false),
        Err(CliError::Expression(ExpressionError::Parse(_)))
    ));
}
