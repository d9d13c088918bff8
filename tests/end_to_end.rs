use tapejson::{Config, Parser, Writer};

#[test]
fn scenario_flat_object() {
    let mut parser = Parser::new(Config::default());
    let doc = parser.parse_str(r#"{"name":"test","value":42}"#).unwrap();
    let obj = doc.value().as_object().unwrap();
    assert_eq!(obj.size(), 2);
    assert_eq!(
        obj.get("name").unwrap().unwrap().as_string().unwrap().to_string_decoded().unwrap(),
        "test"
    );
    assert_eq!(obj.get("value").unwrap().unwrap().as_number().unwrap().as_int().unwrap(), 42);
}

#[test]
fn scenario_top_level_array() {
    let mut parser = Parser::new(Config::default());
    let doc = parser.parse_str("[1,2,3]").unwrap();
    let arr = doc.value().as_array().unwrap();
    assert_eq!(arr.size(), 3);
    assert_eq!(arr.get(0).unwrap().as_number().unwrap().as_int().unwrap(), 1);

    let collected: Vec<i64> = arr
        .iterate()
        .map(|v| v.as_number().unwrap().as_long().unwrap())
        .collect();
    assert_eq!(collected, vec![1, 2, 3]);
}

#[test]
fn scenario_quoted_numeric_strings_memoize() {
    let mut parser = Parser::new(Config::default());
    let doc = parser
        .parse_str(r#"{"symbol":"BTCUSDT","price":"27000.50","qty":"0.125"}"#)
        .unwrap();
    let obj = doc.value().as_object().unwrap();
    let price = obj.get("price").unwrap().unwrap().as_string().unwrap();
    assert_eq!(price.parse_double().unwrap(), 27000.5);
    // Second call returns the memoized result rather than re-walking bytes.
    assert_eq!(price.parse_double().unwrap(), 27000.5);
}

#[test]
fn scenario_nested_order_book() {
    let mut parser = Parser::new(Config::default());
    let doc = parser
        .parse_str(r#"{"asks":[["27000.5","8.760"],["27001.0","0.400"]]}"#)
        .unwrap();
    let obj = doc.value().as_object().unwrap();
    let asks = obj.get("asks").unwrap().unwrap().as_array().unwrap();
    let first_level = asks.get(0).unwrap().as_array().unwrap();
    let qty = first_level.get(1).unwrap().as_string().unwrap();
    assert_eq!(qty.parse_double().unwrap(), 8.760);
}

#[test]
fn scenario_escape_decoding() {
    let mut parser = Parser::new(Config::default());
    let doc = parser.parse_str("\"Line 1\\nLine 2\\tTab\"").unwrap();
    let s = doc.value().as_string().unwrap();
    assert_eq!(s.to_string_decoded().unwrap(), "Line 1\nLine 2\tTab");
}

#[test]
fn scenario_nesting_depth_limit() {
    let json = r#"{"l1":{"l2":{"l3":{"l4":{"l5":{"l6":{"l7":{"l8":{"price":"27000.5"}}}}}}}}}"#;

    let mut deep_ok = Parser::new(Config::default());
    assert!(deep_ok.parse_str(json).is_ok());

    let mut shallow = Parser::new(Config::default().with_max_nesting_depth(7));
    let err = shallow.parse_str(json).unwrap_err();
    assert!(matches!(err, tapejson::ParseError::NestingTooDeep { .. }));
}

#[test]
fn scenario_writer_object() {
    let mut w = Writer::new();
    w.object_start().unwrap();
    w.field_string("name", "test").unwrap();
    w.object_end().unwrap();
    assert_eq!(w.as_str(), r#"{"name":"test"}"#);
}

#[test]
fn scenario_writer_integer_boundaries() {
    let mut w = Writer::new();
    w.array_start().unwrap();
    w.write_int(0).unwrap();
    w.write_int(-1).unwrap();
    w.write_long(9223372036854775807).unwrap();
    w.array_end().unwrap();
    assert_eq!(w.as_str(), "[0,-1,9223372036854775807]");
}

#[test]
fn scenario_writer_escapes_newline() {
    let mut w = Writer::new();
    w.object_start().unwrap();
    w.field_string("text", "line1\nline2").unwrap();
    w.object_end().unwrap();
    assert_eq!(w.as_str(), r#"{"text":"line1\nline2"}"#);
}

#[test]
fn scenario_writer_surrogate_pair_round_trips() {
    let mut w = Writer::new();
    w.write_string("\u{1F600}").unwrap();
    assert_eq!(w.as_str(), "\"\u{1F600}\"");

    let mut parser = Parser::new(Config::default());
    let doc = parser.parse_str(w.as_str()).unwrap();
    assert_eq!(doc.value().as_string().unwrap().to_string_decoded().unwrap(), "\u{1F600}");
}

#[test]
fn parse_then_write_round_trips_structurally() {
    let input = r#"{"symbol":"BTCUSDT","price":27000.5,"qty":12,"is_buyer_maker":false,"levels":[1,2,3]}"#;
    let mut parser = Parser::new(Config::default());
    let doc = parser.parse_str(input).unwrap();

    let text = doc.value().to_string().unwrap();

    let mut reparser = Parser::new(Config::default());
    let reparsed = reparser.parse_str(&text).unwrap();

    assert!(doc.value().equals(&reparsed.value()).unwrap());

    let reobj = reparsed.value().as_object().unwrap();
    assert_eq!(
        reobj.get("symbol").unwrap().unwrap().as_string().unwrap().to_string_decoded().unwrap(),
        "BTCUSDT"
    );
    assert_eq!(reobj.get("price").unwrap().unwrap().as_number().unwrap().as_double().unwrap(), 27000.5);
    assert!(!reobj.get("is_buyer_maker").unwrap().unwrap().as_boolean().unwrap());
}

#[test]
fn structural_equals_ignores_field_order_and_numeric_spelling() {
    let mut parser = Parser::new(Config::default());
    let a = parser
        .parse_str(r#"{"symbol":"BTCUSDT","price":27000.50}"#)
        .unwrap();
    let mut parser2 = Parser::new(Config::default());
    let b = parser2
        .parse_str(r#"{"price":27000.5,"symbol":"BTCUSDT"}"#)
        .unwrap();
    assert!(a.value().equals(&b.value()).unwrap());

    let mut parser3 = Parser::new(Config::default());
    let c = parser3.parse_str(r#"{"symbol":"ETHUSDT","price":27000.5}"#).unwrap();
    assert!(!a.value().equals(&c.value()).unwrap());
}

#[test]
fn field_lookup_returns_first_match_in_document_order() {
    let mut parser = Parser::new(Config::default());
    // Duplicate field names are legal JSON; `get` must return the first.
    let doc = parser.parse_str(r#"{"a":1,"a":2}"#).unwrap();
    let obj = doc.value().as_object().unwrap();
    assert_eq!(obj.get("a").unwrap().unwrap().as_number().unwrap().as_int().unwrap(), 1);
}

#[test]
fn idempotent_reparse_of_same_input() {
    let input = r#"{"a":1,"b":[1,2]}"#;
    let mut p1 = Parser::new(Config::default());
    let mut p2 = Parser::new(Config::default());
    let d1 = p1.parse_str(input).unwrap();
    let d2 = p2.parse_str(input).unwrap();
    let o1 = d1.value().as_object().unwrap();
    let o2 = d2.value().as_object().unwrap();
    assert_eq!(o1.get("a").unwrap().unwrap().as_number().unwrap().as_long().unwrap(), o2.get("a").unwrap().unwrap().as_number().unwrap().as_long().unwrap());
    assert_eq!(o1.get("b").unwrap().unwrap().as_array().unwrap().size(), o2.get("b").unwrap().unwrap().as_array().unwrap().size());
}

#[test]
fn numeric_boundary_long_parsing() {
    let mut parser = Parser::new(Config::default());
    let doc = parser.parse_str("9223372036854775807").unwrap();
    assert_eq!(doc.value().as_number().unwrap().as_long().unwrap(), i64::MAX);

    let mut overflow = Parser::new(Config::default());
    let overflow_doc = overflow.parse_str("9223372036854775808").unwrap();
    assert!(overflow_doc.value().as_number().unwrap().as_long().is_err());

    let mut min = Parser::new(Config::default());
    let min_doc = min.parse_str("-9223372036854775808").unwrap();
    assert_eq!(min_doc.value().as_number().unwrap().as_long().unwrap(), i64::MIN);
}
