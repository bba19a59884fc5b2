use anyhow::Result;
use datastore::{Datastore, DatastoreConfig, DatastoreRegistry, Statement, TableName, Value};
use sqlcmd::{
    CommandError, MappingWarning, ParamText, Phase, ProcessorContext, QueryParameters,
    ReadTableSpec, RunSqlSpec, Severity, Status, TableQuery, build_table_query, parse_commands,
    run_all,
};
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::tempdir;

const SETUP: &str = "
CREATE TABLE abc (a INTEGER, b VARCHAR, c DOUBLE);
INSERT INTO abc VALUES (2, 'two', 2.0), (1, 'one', 1.0), (3, 'three', 3.0);
CREATE TABLE obs (id INTEGER, station VARCHAR, flow DOUBLE);
INSERT INTO obs VALUES (1, 'north', 1.5), (2, 'south', 2.25), (3, 'north', 0.75);
CREATE MACRO scaled(x, factor) AS x * factor;
CREATE MACRO obs_since(min_id) AS TABLE SELECT * FROM obs WHERE id >= min_id;
";

fn context(dir: &Path) -> Result<ProcessorContext> {
    let mut config = DatastoreConfig::in_memory("hydro");
    config.init_sql = Some(SETUP.to_string());
    let mut registry = DatastoreRegistry::new();
    registry.insert(Datastore::open(config)?)?;
    Ok(ProcessorContext::new(registry, dir))
}

fn read(query: QueryParameters) -> ReadTableSpec {
    ReadTableSpec::from_query("hydro", query)
}

fn sql(text: &str) -> QueryParameters {
    QueryParameters {
        sql: Some(text.to_string()),
        ..Default::default()
    }
}

fn params(pairs: &[(&str, ParamText)]) -> BTreeMap<String, ParamText> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_table_query_statement() -> Result<()> {
    let dir = tempdir()?;
    let ctx = context(dir.path())?;
    let store = ctx.datastores.lookup("hydro")?;

    let query = TableQuery {
        table: TableName::new("abc"),
        columns: vec!["a".to_string(), "b".to_string()],
        order_by: vec!["a".to_string()],
        top: Some(10),
    };
    let statement = build_table_query(store.client(), &query)?;
    assert_eq!(
        statement.sql(),
        r#"SELECT "a", "b" FROM "abc" ORDER BY "a" ASC LIMIT 10"#
    );

    let rejected = TableQuery {
        columns: vec!["a".to_string(), "z".to_string()],
        ..query.clone()
    };
    let err = build_table_query(store.client(), &rejected).expect_err("z is not a column");
    assert!(matches!(err, CommandError::ParameterValidation { .. }));
    assert!(err.to_string().contains("column \"z\""));

    // Column names match exactly, order-by names ignore case.
    let upper = TableQuery {
        columns: vec!["A".to_string()],
        ..query.clone()
    };
    assert!(build_table_query(store.client(), &upper).is_err());
    let upper_order = TableQuery {
        order_by: vec!["A desc".to_string()],
        ..query.clone()
    };
    let statement = build_table_query(store.client(), &upper_order)?;
    assert!(statement.sql().ends_with(r#"ORDER BY "a" DESC LIMIT 10"#));

    let missing = TableQuery {
        table: TableName::new("nope"),
        ..query
    };
    assert!(matches!(
        build_table_query(store.client(), &missing),
        Err(CommandError::MetadataLookup { .. })
    ));
    Ok(())
}

#[test]
fn test_columns_of_same_named_table_in_other_schema_rejected() -> Result<()> {
    let dir = tempdir()?;
    let ctx = context(dir.path())?;
    let store = ctx.datastores.lookup("hydro")?;
    store.client().execute(&Statement::batch(
        "CREATE SCHEMA other; CREATE TABLE other.obs (z INTEGER);",
    ))?;

    let query = TableQuery {
        table: TableName::new("obs"),
        columns: vec!["z".to_string()],
        order_by: Vec::new(),
        top: None,
    };
    let err = build_table_query(store.client(), &query).expect_err("z is only in other.obs");
    assert!(matches!(err, CommandError::ParameterValidation { .. }));

    let qualified = TableQuery {
        table: TableName::new("obs").with_schema(Some("other".to_string())),
        ..query
    };
    let statement = build_table_query(store.client(), &qualified)?;
    assert_eq!(statement.sql(), r#"SELECT "z" FROM "other"."obs""#);
    assert!(store.client().execute(&statement).is_ok());
    Ok(())
}

#[test]
fn test_read_table_mode() -> Result<()> {
    let dir = tempdir()?;
    let mut ctx = context(dir.path())?;

    let spec = ReadTableSpec {
        row_count_property: Some("Rows".to_string()),
        ..read(QueryParameters {
            table: Some("abc".to_string()),
            columns: Some("a, b".to_string()),
            order_by: Some("a".to_string()),
            top: Some(2),
            ..Default::default()
        })
    };
    let report = spec.run("read-abc", &mut ctx);
    assert_eq!(report.status(), Status::Success, "{:?}", report.entries);
    assert_eq!(report.phase, Phase::Done);

    let table = ctx.tables.get("read-abc").expect("table stored");
    let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(table.rows()[0], vec![Value::Integer(1), Value::from("one")]);
    assert_eq!(ctx.properties.get("Rows"), Some(&Value::Integer(2)));
    Ok(())
}

#[test]
fn test_rejected_column_fails_with_zero_rows() -> Result<()> {
    let dir = tempdir()?;
    let mut ctx = context(dir.path())?;

    let spec = ReadTableSpec {
        row_count_property: Some("Rows".to_string()),
        ..read(QueryParameters {
            table: Some("abc".to_string()),
            columns: Some("a, z".to_string()),
            ..Default::default()
        })
    };
    let report = spec.run("bad-column", &mut ctx);
    assert_eq!(report.status(), Status::Failure);
    assert_eq!(report.phase, Phase::Failed);
    assert!(report.entries[0].message.contains("column \"z\""));
    assert_eq!(report.entries[0].phase, Phase::BuildStatement);
    assert!(ctx.tables.get("bad-column").is_none());
    assert_eq!(ctx.properties.get("Rows"), Some(&Value::Integer(0)));
    Ok(())
}

#[test]
fn test_function_binding_and_return_property() -> Result<()> {
    let dir = tempdir()?;
    let mut ctx = context(dir.path())?;

    let spec = ReadTableSpec {
        function_parameters: params(&[
            ("x", ParamText::Text("21".to_string())),
            ("factor", ParamText::Integer(2)),
        ]),
        return_property: Some("Scaled".to_string()),
        ..read(QueryParameters {
            function: Some("scaled(x INT, factor INT) -> INT".to_string()),
            ..Default::default()
        })
    };
    let report = spec.run("scale", &mut ctx);
    assert_eq!(report.status(), Status::Success, "{:?}", report.entries);
    assert_eq!(ctx.properties.get("Scaled"), Some(&Value::Integer(42)));
    Ok(())
}

#[test]
fn test_coercion_failure_skips_call() -> Result<()> {
    let dir = tempdir()?;
    let mut ctx = context(dir.path())?;

    let spec = ReadTableSpec {
        function_parameters: params(&[("x", ParamText::Text("abc".to_string()))]),
        return_property: Some("Scaled".to_string()),
        ..read(QueryParameters {
            function: Some("scaled(x INT, factor INT)".to_string()),
            ..Default::default()
        })
    };
    let report = spec.run("scale", &mut ctx);
    assert_eq!(report.status(), Status::Failure);
    // One entry per bad parameter plus the summary.
    assert_eq!(report.count(Severity::Failure), 3);
    assert!(report.entries[0].message.contains("\"abc\" is not a valid INT"));
    assert!(report.entries[1].message.contains("factor"));
    assert!(ctx.properties.get("Scaled").is_none());
    Ok(())
}

#[test]
fn test_unknown_routine_argument_rejected() -> Result<()> {
    let dir = tempdir()?;
    let mut ctx = context(dir.path())?;

    let spec = ReadTableSpec {
        procedure_parameters: params(&[
            ("min_id", ParamText::Integer(2)),
            ("extra", ParamText::Integer(1)),
        ]),
        ..read(QueryParameters {
            procedure: Some("obs_since(min_id INT)".to_string()),
            ..Default::default()
        })
    };
    let report = spec.run("since", &mut ctx);
    assert_eq!(report.status(), Status::Failure);
    assert_eq!(report.entries[0].phase, Phase::ValidateParams);
    assert!(report.entries[0].message.contains("extra is not a parameter"));
    Ok(())
}

#[test]
fn test_procedure_table() -> Result<()> {
    let dir = tempdir()?;
    let mut ctx = context(dir.path())?;

    let spec = ReadTableSpec {
        procedure_parameters: params(&[("min_id", ParamText::Integer(2))]),
        table_id: Some("recent".to_string()),
        row_count_property: Some("RecentRows".to_string()),
        ..read(QueryParameters {
            procedure: Some("obs_since(min_id INT)".to_string()),
            ..Default::default()
        })
    };
    let report = spec.run("since", &mut ctx);
    assert_eq!(report.status(), Status::Success, "{:?}", report.entries);
    assert_eq!(ctx.tables.get("recent").map(|t| t.row_count()), Some(2));
    assert_eq!(ctx.properties.get("RecentRows"), Some(&Value::Integer(2)));
    Ok(())
}

#[test]
fn test_zero_width_strings_warn_once() -> Result<()> {
    let dir = tempdir()?;
    let mut ctx = context(dir.path())?;

    let report = read(sql("SELECT '' AS s FROM range(2)")).run("empty-strings", &mut ctx);
    assert_eq!(report.status(), Status::Warning);
    assert_eq!(report.count(Severity::Warning), 1);
    assert_eq!(
        report.entries[0].message,
        MappingWarning::ZeroWidthStrings {
            table: "empty-strings".to_string(),
            rows: 2
        }
        .to_string()
    );
    assert_eq!(ctx.tables.get("empty-strings").map(|t| t.row_count()), Some(2));
    Ok(())
}

#[test]
fn test_output_properties() -> Result<()> {
    let dir = tempdir()?;
    let mut ctx = context(dir.path())?;

    let spec = ReadTableSpec {
        output_properties: Some("station:Station, nope:Nope, flow:Flow".to_string()),
        ..read(sql("SELECT station, flow FROM obs WHERE id = 2"))
    };
    let report = spec.run("one-row", &mut ctx);
    assert_eq!(report.status(), Status::Warning);
    assert_eq!(report.count(Severity::Warning), 1);
    assert!(report.entries[0].message.contains("\"nope\""));
    assert_eq!(ctx.properties.get("Station"), Some(&Value::from("south")));
    assert_eq!(ctx.properties.get("Flow"), Some(&Value::Float(2.25)));
    assert!(ctx.properties.get("Nope").is_none());
    Ok(())
}

#[test]
fn test_sql_file_with_properties() -> Result<()> {
    let dir = tempdir()?;
    std::fs::write(
        dir.path().join("north.sql"),
        "/* flows at one station */\nSELECT * FROM obs WHERE station = '${Station}'",
    )?;
    let mut ctx = context(dir.path())?;
    ctx.properties.set("Station", "north");
    ctx.properties.set("SqlName", "north");

    let spec = ReadTableSpec {
        row_count_property: Some("Rows".to_string()),
        ..read(QueryParameters {
            sql_file: Some("${SqlName}.sql".to_string()),
            ..Default::default()
        })
    };
    let report = spec.run("north", &mut ctx);
    assert_eq!(report.status(), Status::Success, "{:?}", report.entries);
    assert_eq!(ctx.properties.get("Rows"), Some(&Value::Integer(2)));

    let missing = ReadTableSpec {
        row_count_property: Some("Rows".to_string()),
        ..read(QueryParameters {
            sql_file: Some("missing.sql".to_string()),
            ..Default::default()
        })
    };
    let report = missing.run("missing", &mut ctx);
    assert_eq!(report.status(), Status::Failure);
    assert_eq!(ctx.properties.get("Rows"), Some(&Value::Integer(0)));
    Ok(())
}

#[test]
fn test_read_table_requires_select() -> Result<()> {
    let dir = tempdir()?;
    let mut ctx = context(dir.path())?;

    let report = read(sql("/* cleanup */ DELETE FROM obs")).run("delete", &mut ctx);
    assert_eq!(report.status(), Status::Failure);
    assert_eq!(report.entries[0].phase, Phase::ValidateParams);
    assert!(report.entries[0].message.contains("SELECT"));

    // Checked before the datastore is looked up.
    let elsewhere = ReadTableSpec {
        datastore: "other".to_string(),
        ..read(sql("DELETE FROM obs"))
    };
    let report = elsewhere.run("elsewhere", &mut ctx);
    assert_eq!(report.entries[0].phase, Phase::ValidateParams);
    assert!(report.entries[0].message.contains("SELECT"));

    let cleanup = dir.path().join("cleanup.sql");
    std::fs::write(&cleanup, "DELETE FROM obs")?;
    let report = read(QueryParameters {
        sql_file: Some("cleanup.sql".to_string()),
        ..Default::default()
    })
    .run("cleanup-file", &mut ctx);
    assert_eq!(report.entries[0].phase, Phase::ValidateParams);

    let count = read(sql("SELECT * FROM obs")).run("count", &mut ctx);
    assert_eq!(count.status(), Status::Success);
    assert_eq!(ctx.tables.get("count").map(|t| t.row_count()), Some(3));
    Ok(())
}

#[test]
fn test_modes_are_exclusive_and_datastore_must_exist() -> Result<()> {
    let dir = tempdir()?;
    let mut ctx = context(dir.path())?;

    let both = read(QueryParameters {
        table: Some("obs".to_string()),
        sql: Some("SELECT 1".to_string()),
        ..Default::default()
    });
    let report = both.run("both", &mut ctx);
    assert_eq!(report.status(), Status::Failure);
    assert_eq!(report.entries[0].phase, Phase::ValidateParams);

    let elsewhere = ReadTableSpec {
        datastore: "other".to_string(),
        ..read(sql("SELECT 1"))
    };
    let report = elsewhere.run("elsewhere", &mut ctx);
    assert_eq!(report.status(), Status::Failure);
    assert!(report.entries[0].message.contains("datastore \"other\""));

    // Datastore names ignore case.
    let upper = ReadTableSpec {
        datastore: "HYDRO".to_string(),
        ..read(sql("SELECT 1 AS one"))
    };
    assert_eq!(upper.run("upper", &mut ctx).status(), Status::Success);
    Ok(())
}

#[test]
fn test_run_sql_statements() -> Result<()> {
    let dir = tempdir()?;
    let mut ctx = context(dir.path())?;

    let create = RunSqlSpec {
        datastore: "hydro".to_string(),
        sql: Some("CREATE TABLE t AS SELECT * FROM range(4) r(n)".to_string()),
        row_count_property: Some("Created".to_string()),
        ..Default::default()
    };
    let report = create.run("create", &mut ctx);
    assert_eq!(report.status(), Status::Success, "{:?}", report.entries);
    assert_eq!(ctx.properties.get("Created"), Some(&Value::Integer(0)));
    assert!(ctx.tables.is_empty());

    let select = RunSqlSpec {
        datastore: "hydro".to_string(),
        sql: Some("SELECT n FROM t".to_string()),
        table_id: Some("t".to_string()),
        ..Default::default()
    };
    assert_eq!(select.run("select", &mut ctx).status(), Status::Success);
    assert_eq!(ctx.tables.get("t").map(|t| t.row_count()), Some(4));

    let broken = RunSqlSpec {
        datastore: "hydro".to_string(),
        sql: Some("DROP TABLE no_such_table".to_string()),
        ..Default::default()
    };
    let report = broken.run("broken", &mut ctx);
    assert_eq!(report.status(), Status::Failure);
    assert_eq!(report.entries[0].phase, Phase::Execute);
    assert!(report.entries[0].message.contains("DROP TABLE no_such_table"));
    Ok(())
}

#[test]
fn test_command_file_runs_past_failures() -> Result<()> {
    let dir = tempdir()?;
    let mut ctx = context(dir.path())?;

    let yaml = r#"
- kind: RunSql
  name: seed
  spec:
    datastore: "{{ store }}"
    sql: INSERT INTO obs VALUES (4, 'east', 5.0)
- kind: ReadTableFromDatastore
  name: broken
  spec:
    datastore: "{{ store }}"
    table: obs
    columns: missing
- kind: ReadTableFromDatastore
  name: east
  spec:
    datastore: "{{ store }}"
    sql: SELECT flow FROM obs WHERE station = 'east'
    outputProperties: flow:EastFlow
"#;
    let mut vars = BTreeMap::new();
    vars.insert("store".to_string(), "hydro".to_string());
    let commands = parse_commands(yaml, &vars)?;
    let reports = run_all(&commands, &mut ctx);

    let statuses: Vec<Status> = reports.iter().map(|r| r.status()).collect();
    assert_eq!(
        statuses,
        vec![Status::Success, Status::Failure, Status::Success]
    );
    assert_eq!(ctx.properties.get("EastFlow"), Some(&Value::Float(5.0)));
    Ok(())
}
