#[cfg(test)]
mod tests {
    use crate::columns::ColumnSelector;
    use crate::compiler::{Assignments, Compiler};
    use crate::conditions::ConditionTree;
    use crate::config::{Config, EmptyColumns, FullJoinKeyword};
    use crate::error::CompileError;
    use crate::options::OptionsSpec;
    use crate::tables::TableSelector;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn where_sql(v: serde_json::Value) -> String {
        ConditionTree::from_json(&v).unwrap().render(None).unwrap()
    }

    #[test]
    fn implicit_and_explicit_and() {
        let want = "col1 = \"a\" AND col2 = 2 AND col3 IS NULL";
        assert_eq!(where_sql(json!({"col1": "a", "col2": 2, "col3": null})), want);
        assert_eq!(
            where_sql(json!({"and": {"col1": "a", "col2": 2, "col3": null}})),
            want
        );
    }

    #[test]
    fn string_values_use_operator_syntax() {
        assert_eq!(
            where_sql(json!({"a": "> 5", "b": "~{{%x y%}}", "c": "! null", "d": 2.5})),
            "a > 5 AND b LIKE \"%x y%\" AND c IS NOT NULL AND d = 2.5"
        );
    }

    #[test]
    fn or_object_with_lists_and_integer_keyed_groups() {
        let tree = json!({
            "or": {
                "col1": ["a", 1],
                "0": {"col2": "b", "col3": 3.1},
                "1": {"col4": "c", "col5": [-7, null]}
            }
        });
        assert_eq!(
            where_sql(tree),
            "col1 = \"a\" OR col1 = 1 \
             OR col2 = \"b\" AND col3 = 3.1 \
             OR col4 = \"c\" AND col5 = -7 AND col5 IS NULL"
        );
    }

    #[test]
    fn or_array_with_and_sibling() {
        let tree = json!({
            "and": {"col3": 3.3},
            "or": [
                {"col1": "a"},
                {"and": {"col2": 2, "col4": "d"}}
            ]
        });
        assert_eq!(
            where_sql(tree),
            "col1 = \"a\" AND col3 = 3.3 OR col2 = 2 AND col4 = \"d\" AND col3 = 3.3"
        );
    }

    #[test]
    fn malformed_condition_shapes() {
        let bad = [
            json!("col = 1"),
            json!({"and": {"a": 1}, "b": 2}),
            json!({"and": [1, 2]}),
            json!({"and": {"a": {"b": 1}}}),
            json!({"and": {"or": {"a": 1}}}),
            json!({"or": {"group": {"a": 1}}}),
            json!({"or": [{"a": 1, "b": 2}]}),
            json!({"or": 5}),
            json!({"a": [[1]]}),
        ];
        for v in bad {
            assert!(
                matches!(ConditionTree::from_json(&v), Err(CompileError::InvalidArgument(_))),
                "{v}"
            );
        }
        assert!(ConditionTree::from_json(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn columns_from_object_and_array() {
        let by_object = ColumnSelector::from_json(&json!({
            "t.a": "alpha",
            "0": "t.b",
            "t.c": null
        }))
        .unwrap();
        let by_array =
            ColumnSelector::from_json(&json!([{"t.a": "alpha"}, "t.b", "t.c"])).unwrap();
        let want = "t.a AS t__msqp__a__as__alpha, t.b AS t__msqp__b__as__b, t.c AS t__msqp__c__as__c";
        assert_eq!(by_object.render(EmptyColumns::Wildcard).unwrap(), want);
        assert_eq!(by_array.render(EmptyColumns::Wildcard).unwrap(), want);

        assert!(ColumnSelector::from_json(&json!({"t.a": 1})).is_err());
        assert!(ColumnSelector::from_json(&json!([1])).is_err());
        assert!(ColumnSelector::from_json(&json!("t.a")).is_err());
    }

    #[test]
    fn tables_with_join_codes_and_names() {
        let sel = TableSelector::from_json(&json!([
            "table1",
            {"table2": {
                "1": {"table3": {"ref_table2": "id"}},
                "left": {"table4": {"a": "b", "c": "d"}},
                "5": {"table5": null}
            }}
        ]))
        .unwrap();
        assert_eq!(
            sel.render(FullJoinKeyword::Full).unwrap(),
            "table1, table2 INNER JOIN table3 ON table3.ref_table2 = table2.id \
             LEFT JOIN table4 ON table4.a = table2.b AND table4.c = table2.d \
             CROSS JOIN table5"
        );
        assert_eq!(
            TableSelector::from_json(&json!("users")).unwrap(),
            TableSelector::single("users")
        );
    }

    #[test]
    fn unknown_join_codes_are_errors() {
        for v in [
            json!([{"t1": {"9": {"t2": {"a": "b"}}}}]),
            json!([{"t1": {"OUTER": {"t2": {"a": "b"}}}}]),
            json!([{"t1": {"1": {"t2": {"a": 1}}}}]),
            json!([{"t1": ["t2"]}]),
            json!(5),
        ] {
            assert!(TableSelector::from_json(&v).is_err(), "{v}");
        }
    }

    #[test]
    fn options_in_every_accepted_shape() {
        let opts = OptionsSpec::from_json(&json!({
            "limit": 10,
            "order": {"0": "col1", "col2": "ASC", "col3": "DESC"},
            "group": ["col1", "col2"],
            "ignored": true
        }))
        .unwrap();
        assert_eq!(
            opts.render().unwrap(),
            " GROUP BY col1, col2 ORDER BY col1 ASC, col2 ASC, col3 DESC LIMIT 10"
        );

        let opts = OptionsSpec::from_json(&json!({
            "group": "col",
            "order": ["a", {"b": "desc"}],
            "limit": "1, 23"
        }))
        .unwrap();
        assert_eq!(opts.render().unwrap(), " GROUP BY col ORDER BY a ASC, b DESC LIMIT 1, 23");

        assert_eq!(
            OptionsSpec::from_json(&json!({"order": "col"})).unwrap().render().unwrap(),
            " ORDER BY col ASC"
        );
        assert!(OptionsSpec::from_json(&json!({"limit": -1})).is_err());
        assert!(OptionsSpec::from_json(&json!({"group": 3})).is_err());
        assert!(OptionsSpec::from_json(&json!([])).is_err());
    }

    #[test]
    fn write_data_keeps_strings_verbatim() {
        let data = Assignments::from_json(&json!({"name": "> 5", "age": 3, "x": null})).unwrap();
        let out = Compiler::with_config(Config::default())
            .insert("t", &data, false)
            .unwrap();
        assert_eq!(out.sql, "INSERT INTO t (name, age, x) VALUES (\"> 5\", 3, NULL);");
        assert!(Assignments::from_json(&json!({"a": [1]})).is_err());
    }
}
