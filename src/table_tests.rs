#[cfg(test)]
mod tests {
    use crate::binder::Bindings;
    use crate::columns::{ColumnSelector, encode_alias};
    use crate::compiler::{Assignments, Compiler, Filter};
    use crate::conditions::ConditionTree;
    use crate::config::Config;
    use crate::connection::{ColumnInfo, Connection, ConnectionError, Row, SharedConnection};
    use crate::entry::Entry;
    use crate::options::OptionsSpec;
    use crate::row::DecodeError;
    use crate::table::{Table, TableError};
    use crate::tables::{Join, TableSelector};
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, VecDeque};
    use std::rc::Rc;

    /// 记录所有语句，并按顺序返回预先准备的结果。
    #[derive(Debug, Default)]
    struct RecordingConnection {
        executed: Vec<(String, Vec<(String, SqlValue)>)>,
        results: VecDeque<Vec<Row>>,
        schema: BTreeMap<String, Vec<ColumnInfo>>,
        describe_calls: usize,
        next_id: i64,
    }

    impl Connection for RecordingConnection {
        fn execute(&mut self, sql: &str, bindings: &Bindings) -> Result<Vec<Row>, ConnectionError> {
            self.executed.push((sql.to_string(), bindings.all().to_vec()));
            Ok(self.results.pop_front().unwrap_or_default())
        }

        fn describe(&mut self, table: &str) -> Result<Vec<ColumnInfo>, ConnectionError> {
            self.describe_calls += 1;
            self.schema
                .get(table)
                .cloned()
                .ok_or_else(|| ConnectionError::UnknownTable(table.to_string()))
        }

        fn last_insert_id(&self) -> Result<SqlValue, ConnectionError> {
            Ok(SqlValue::I64(self.next_id))
        }
    }

    fn setup() -> (Rc<RefCell<RecordingConnection>>, Table) {
        let mock = Rc::new(RefCell::new(RecordingConnection::default()));
        {
            let mut m = mock.borrow_mut();
            m.schema.insert(
                "users".to_string(),
                vec![ColumnInfo::primary("id"), ColumnInfo::new("name")],
            );
            m.schema
                .insert("posts".to_string(), vec![ColumnInfo::primary("id"), ColumnInfo::new("user_id")]);
            m.schema.insert("logs".to_string(), vec![ColumnInfo::new("line")]);
            m.next_id = 42;
        }
        let conn: SharedConnection = mock.clone();
        let table = Table::with_compiler(conn, "users", Compiler::with_config(Config::default()));
        (mock, table)
    }

    fn user_row(id: i64, name: &'static str, name_alias: &str) -> Row {
        vec![
            (encode_alias("users", "id", "id"), SqlValue::I64(id)),
            (encode_alias("users", "name", name_alias), SqlValue::from(name)),
        ]
    }

    fn last_sql(mock: &Rc<RefCell<RecordingConnection>>) -> (String, Vec<(String, SqlValue)>) {
        mock.borrow().executed.last().cloned().unwrap()
    }

    #[test]
    fn select_expands_columns_and_binds_values() {
        let (mock, users) = setup();
        mock.borrow_mut()
            .results
            .push_back(vec![user_row(1, "ann", "name"), user_row(2, "bob", "name")]);

        let mut rs = users
            .select(
                ColumnSelector::new(),
                &ConditionTree::new().and("name", "!= zed"),
                &OptionsSpec::new().order_by("id"),
            )
            .unwrap();

        assert_eq!(
            last_sql(&mock),
            (
                "SELECT users.id AS users__msqp__id__as__id, users.name AS users__msqp__name__as__name \
                 FROM users WHERE name != :param0 ORDER BY id ASC;"
                    .to_string(),
                vec![(":param0".to_string(), SqlValue::from("zed"))],
            )
        );
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.fetch().unwrap().get("name"), Some(&SqlValue::from("ann")));
        assert_eq!(rs.fetch().unwrap().get("id"), Some(&SqlValue::I64(2)));
        assert!(rs.fetch().is_none());
        rs.rewind();
        assert_eq!(rs.fetch().unwrap().get("id"), Some(&SqlValue::I64(1)));
    }

    #[test]
    fn entry_resolves_aliases_and_writes_back() {
        let (mock, users) = setup();
        mock.borrow_mut()
            .results
            .push_back(vec![user_row(1, "ann", "user_name")]);

        let columns = ColumnSelector::new()
            .column("users.id")
            .aliased("users.name", "user_name");
        let mut rs = users
            .select(columns, &ConditionTree::new(), &OptionsSpec::new())
            .unwrap();
        let entry = rs.fetch().unwrap();

        assert_eq!(entry.get("user_name"), Some(&SqlValue::from("ann")));
        assert_eq!(entry.get("name"), Some(&SqlValue::from("ann")));

        entry.set("user_name", "bea");
        assert_eq!(entry.changes(), &[("name".to_string(), SqlValue::from("bea"))]);
        entry.update().unwrap();

        assert_eq!(
            last_sql(&mock),
            (
                "UPDATE users SET name = :param0 WHERE id = 1;".to_string(),
                vec![(":param0".to_string(), SqlValue::from("bea"))],
            )
        );
        assert!(!entry.is_dirty());
        assert_eq!(entry.get("user_name"), Some(&SqlValue::from("bea")));
    }

    #[test]
    fn bare_columns_belong_to_the_queried_table() {
        let (mock, users) = setup();
        mock.borrow_mut()
            .results
            .push_back(vec![user_row(3, "ann", "label")]);

        let mut rs = users
            .select(
                crate::columns!["id", "name" => "label"],
                &ConditionTree::new(),
                &OptionsSpec::new(),
            )
            .unwrap();
        assert_eq!(
            last_sql(&mock).0,
            "SELECT users.id AS users__msqp__id__as__id, users.name AS users__msqp__name__as__label \
             FROM users;"
        );

        let entry = rs.fetch().unwrap();
        assert_eq!(entry.get("name"), Some(&SqlValue::from("ann")));
        assert_eq!(entry.get("label"), Some(&SqlValue::from("ann")));
        assert!(entry.joined("").is_none());

        entry.set("name", "bea");
        entry.update().unwrap();
        assert_eq!(last_sql(&mock).0, "UPDATE users SET name = :param0 WHERE id = 3;");
    }

    #[test]
    fn new_entry_insert_stores_primary_key() {
        let (mock, users) = setup();
        let mut entry = Entry::new(users.clone());
        entry.set("name", "zed");

        assert_eq!(entry.insert().unwrap(), SqlValue::I64(42));
        assert_eq!(
            last_sql(&mock).0,
            "INSERT INTO users (name) VALUES (:param0);"
        );
        assert_eq!(entry.get("id"), Some(&SqlValue::I64(42)));
        assert_eq!(entry.get("name"), Some(&SqlValue::from("zed")));

        entry.delete().unwrap();
        assert_eq!(last_sql(&mock).0, "DELETE FROM users WHERE id = 42;");
    }

    #[test]
    fn result_set_updates_and_deletes_every_entry() {
        let (mock, users) = setup();
        mock.borrow_mut()
            .results
            .push_back(vec![user_row(1, "ann", "name"), user_row(2, "bob", "name")]);
        let mut rs = users
            .select(ColumnSelector::new(), &ConditionTree::new(), &OptionsSpec::new())
            .unwrap();

        rs.update(&[("name", SqlValue::from("x"))]).unwrap();
        rs.delete().unwrap();

        let sqls: Vec<String> = mock
            .borrow()
            .executed
            .iter()
            .skip(1)
            .map(|(sql, _)| sql.clone())
            .collect();
        assert_eq!(
            sqls,
            vec![
                "UPDATE users SET name = :param0 WHERE id = 1;",
                "UPDATE users SET name = :param0 WHERE id = 2;",
                "DELETE FROM users WHERE id = 1;",
                "DELETE FROM users WHERE id = 2;",
            ]
        );
        assert!(rs.fetch_all().iter().all(|e| e.get("name") == Some(&SqlValue::from("x"))));
    }

    #[test]
    fn joined_tables_are_reachable_from_entry() {
        let (mock, users) = setup();
        let mut row = user_row(1, "ann", "name");
        row.push((encode_alias("posts", "id", "post_id"), SqlValue::I64(9)));
        row.push((encode_alias("posts", "user_id", "user_id"), SqlValue::I64(1)));
        mock.borrow_mut().results.push_back(vec![row]);

        let tables = TableSelector::list().joined("users", [Join::left("posts").on("user_id", "id")]);
        let rs = users
            .select_from(&tables, ColumnSelector::new(), &ConditionTree::new(), &OptionsSpec::new())
            .unwrap();

        assert_eq!(
            last_sql(&mock).0,
            "SELECT users.id AS users__msqp__id__as__id, users.name AS users__msqp__name__as__name, \
             posts.id AS posts__msqp__id__as__id, posts.user_id AS posts__msqp__user_id__as__user_id \
             FROM users LEFT JOIN posts ON posts.user_id = users.id;"
        );
        let entry = &rs.fetch_all()[0];
        assert_eq!(entry.columns().len(), 2);
        let posts = entry.joined("posts").unwrap();
        assert_eq!(posts.get("id").map(|c| c.alias.as_str()), Some("post_id"));
        assert!(entry.joined("users").is_none());
    }

    #[test]
    fn primary_key_is_described_once() {
        let (mock, users) = setup();
        assert_eq!(users.primary_column().unwrap(), "id");
        assert_eq!(users.primary_column().unwrap(), "id");
        assert_eq!(mock.borrow().describe_calls, 1);
    }

    #[test]
    fn table_level_writes() {
        let (mock, users) = setup();
        let id = users
            .insert(&Assignments::new().set("name", "ann"))
            .unwrap();
        assert_eq!(id, SqlValue::I64(42));

        users
            .update(&Assignments::new().set("name", "b"), &Filter::AllRows)
            .unwrap();
        assert_eq!(last_sql(&mock).0, "UPDATE users SET name = :param0;");

        users
            .delete(&ConditionTree::new().and("id", "> 10").into())
            .unwrap();
        assert_eq!(last_sql(&mock).0, "DELETE FROM users WHERE id > 10;");
    }

    #[test]
    fn object_layer_errors() {
        let (mock, users) = setup();

        let mut fresh = Entry::new(users.clone());
        assert_eq!(fresh.update(), Err(TableError::EmptyChangeSet));
        fresh.set("name", "x");
        assert_eq!(
            fresh.update(),
            Err(TableError::MissingPrimaryKey("users".to_string()))
        );

        let conn: SharedConnection = mock.clone();
        let logs = Table::with_compiler(conn.clone(), "logs", Compiler::with_config(Config::default()));
        assert_eq!(
            logs.primary_column(),
            Err(TableError::MissingPrimaryKey("logs".to_string()))
        );

        let ghost = Table::with_compiler(conn, "ghost", Compiler::with_config(Config::default()));
        assert_eq!(
            ghost
                .select(ColumnSelector::new(), &ConditionTree::new(), &OptionsSpec::new())
                .unwrap_err(),
            TableError::Connection(ConnectionError::UnknownTable("ghost".to_string()))
        );

        mock.borrow_mut()
            .results
            .push_back(vec![vec![("id".to_string(), SqlValue::I64(1))]]);
        assert_eq!(
            users
                .select(ColumnSelector::new(), &ConditionTree::new(), &OptionsSpec::new())
                .unwrap_err(),
            TableError::Decode(DecodeError::MalformedLabel("id".to_string()))
        );

        assert!(matches!(
            users.delete(&Filter::Where(ConditionTree::new())),
            Err(TableError::Compile(_))
        ));
    }
}
